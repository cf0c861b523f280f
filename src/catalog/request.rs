use crate::config::CatalogConfig;
use crate::explorer::FilterState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Genres,
    Search,
    Discover,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Genres => "/genre/movie/list",
            Endpoint::Search => "/search/movie",
            Endpoint::Discover => "/discover/movie",
        }
    }
}

/// A catalog GET request: endpoint plus ordered query parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogRequest {
    pub endpoint: Endpoint,
    pub params: Vec<(&'static str, String)>,
}

impl CatalogRequest {
    pub fn genres(config: &CatalogConfig) -> Self {
        Self {
            endpoint: Endpoint::Genres,
            params: vec![
                ("api_key", config.api_key.clone()),
                ("language", config.language.clone()),
            ],
        }
    }

    /// Build the movie request for a filter snapshot. A non-empty search
    /// term selects the search endpoint, anything else browses.
    pub fn movies(filters: &FilterState, config: &CatalogConfig) -> Self {
        let endpoint = if filters.search_term.is_empty() {
            Endpoint::Discover
        } else {
            Endpoint::Search
        };

        let mut params = vec![
            ("api_key", config.api_key.clone()),
            ("language", config.language.clone()),
            ("page", filters.page.to_string()),
        ];

        if !filters.search_term.is_empty() {
            params.push(("query", filters.search_term.clone()));
        }
        if let Some(genre) = filters.genre_id.as_deref().filter(|g| !g.is_empty()) {
            params.push(("with_genres", genre.to_string()));
        }
        if let Some(year) = filters.release_year.as_deref().and_then(year_of) {
            params.push(("primary_release_year", year.to_string()));
        }

        Self { endpoint, params }
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn query_string(&self) -> String {
        self.params
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    pub fn url(&self, base: &str) -> String {
        format!(
            "{}{}?{}",
            base.trim_end_matches('/'),
            self.endpoint.path(),
            self.query_string()
        )
    }
}

/// Leading year component of "YYYY-MM-DD" (or of a bare "YYYY").
fn year_of(date: &str) -> Option<&str> {
    date.split('-').next().filter(|y| !y.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> CatalogConfig {
        CatalogConfig {
            api_key: "KEY".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_search_browses() {
        let req = CatalogRequest::movies(&FilterState::default(), &config());
        assert_eq!(req.endpoint, Endpoint::Discover);
        assert_eq!(req.param("query"), None);
        assert_eq!(req.query_string(), "api_key=KEY&language=en-US&page=1");
    }

    #[test]
    fn test_search_term_selects_search() {
        let filters = FilterState {
            search_term: "matrix".to_string(),
            ..Default::default()
        };
        let req = CatalogRequest::movies(&filters, &config());
        assert_eq!(req.endpoint, Endpoint::Search);
        assert_eq!(
            req.url("https://api.themoviedb.org/3/"),
            "https://api.themoviedb.org/3/search/movie?api_key=KEY&language=en-US&page=1&query=matrix"
        );
    }

    #[test]
    fn test_release_date_truncated_to_year() {
        let filters = FilterState {
            release_year: Some("1999-03-31".to_string()),
            ..Default::default()
        };
        let req = CatalogRequest::movies(&filters, &config());
        assert_eq!(req.param("primary_release_year"), Some("1999"));

        let filters = FilterState {
            release_year: Some("2004".to_string()),
            ..Default::default()
        };
        let req = CatalogRequest::movies(&filters, &config());
        assert_eq!(req.param("primary_release_year"), Some("2004"));
    }

    #[test]
    fn test_all_filters_in_order() {
        let filters = FilterState {
            search_term: "star wars".to_string(),
            genre_id: Some("878".to_string()),
            release_year: Some("1977-05-25".to_string()),
            page: 3,
        };
        let req = CatalogRequest::movies(&filters, &config());
        assert_eq!(
            req.query_string(),
            "api_key=KEY&language=en-US&page=3&query=star%20wars&with_genres=878&primary_release_year=1977"
        );
    }

    #[test]
    fn test_empty_optionals_are_omitted() {
        let filters = FilterState {
            genre_id: Some(String::new()),
            release_year: Some(String::new()),
            ..Default::default()
        };
        let req = CatalogRequest::movies(&filters, &config());
        assert_eq!(req.param("with_genres"), None);
        assert_eq!(req.param("primary_release_year"), None);
    }

    #[test]
    fn test_genres_request() {
        let req = CatalogRequest::genres(&config());
        assert_eq!(
            req.url("http://localhost"),
            "http://localhost/genre/movie/list?api_key=KEY&language=en-US"
        );
    }
}
