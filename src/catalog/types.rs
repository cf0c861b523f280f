use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genre {
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub vote_average: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub release_date: String,
    #[serde(default)]
    pub overview: Option<String>,
}

impl Movie {
    pub fn overview(&self) -> Option<&str> {
        self.overview.as_deref().filter(|s| !s.is_empty())
    }

    pub fn poster_path(&self) -> Option<&str> {
        self.poster_path.as_deref().filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenreList {
    pub genres: Vec<Genre>,
}

/// Body of the search and discover endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MoviePage {
    #[serde(default)]
    pub results: Option<Vec<Movie>>,
    #[serde(default)]
    pub total_pages: Option<u32>,
}

/// One page of results as the explorer stores it.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultPage {
    pub movies: Vec<Movie>,
    pub total_pages: u32,
}

impl Default for ResultPage {
    fn default() -> Self {
        Self {
            movies: Vec::new(),
            total_pages: 1,
        }
    }
}

impl From<MoviePage> for ResultPage {
    fn from(page: MoviePage) -> Self {
        Self {
            movies: page.results.unwrap_or_default(),
            total_pages: page.total_pages.filter(|&n| n > 0).unwrap_or(1),
        }
    }
}

// The catalog sends numeric genre ids; they are only echoed back as a
// query parameter so keep them as text.
fn id_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Num(i64),
        Text(String),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Num(n) => n.to_string(),
        Id::Text(s) => s,
    })
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genre_list_numeric_ids() {
        let list: GenreList =
            serde_json::from_str(r#"{"genres":[{"id":28,"name":"Action"},{"id":"35","name":"Comedy"}]}"#)
                .unwrap();
        assert_eq!(list.genres[0].id, "28");
        assert_eq!(list.genres[1].id, "35");
    }

    #[test]
    fn test_movie_page_missing_fields() {
        let page: MoviePage = serde_json::from_str("{}").unwrap();
        let page = ResultPage::from(page);
        assert!(page.movies.is_empty());
        assert_eq!(page.total_pages, 1);

        let page: MoviePage = serde_json::from_str(r#"{"results":[],"total_pages":0}"#).unwrap();
        assert_eq!(ResultPage::from(page).total_pages, 1);
    }

    #[test]
    fn test_null_vote_average_keeps_page() {
        let page: MoviePage = serde_json::from_str(
            r#"{"results":[{"id":1,"title":"Unrated","vote_average":null},{"id":2,"title":"Rated","vote_average":6.5}],"total_pages":2}"#,
        )
        .unwrap();
        let page = ResultPage::from(page);
        assert_eq!(page.movies.len(), 2);
        assert_eq!(page.movies[0].vote_average, 0.0);
        assert_eq!(page.movies[1].vote_average, 6.5);
    }

    #[test]
    fn test_movie_sparse_record() {
        let movie: Movie = serde_json::from_str(
            r#"{"id":603,"title":"The Matrix","poster_path":null,"vote_average":null,"release_date":null,"overview":""}"#,
        )
        .unwrap();
        assert_eq!(movie.title, "The Matrix");
        assert_eq!(movie.poster_path(), None);
        assert_eq!(movie.release_date, "");
        assert_eq!(movie.vote_average, 0.0);
        assert_eq!(movie.overview(), None);
    }
}
