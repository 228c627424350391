use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EndpointError {
    #[error("invalid server url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("server url must use http or https, got {0}")]
    UnsupportedScheme(String),
}

/// URLs of the enhancement service, all derived from one HTTP base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoints {
    base: Url,
}

impl ServiceEndpoints {
    pub fn parse(server_url: &str) -> Result<Self, EndpointError> {
        let base = Url::parse(server_url)?;
        match base.scheme() {
            "http" | "https" => Ok(Self { base }),
            other => Err(EndpointError::UnsupportedScheme(other.to_string())),
        }
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn upload_url(&self) -> Url {
        self.endpoint(&["upload"])
    }

    /// Push channel for `video_id`, on the websocket flavour of the base scheme.
    pub fn channel_url(&self, video_id: &str) -> Url {
        let mut url = self.endpoint(&["ws"]);
        let scheme = if self.base.scheme() == "https" { "wss" } else { "ws" };
        // http(s) -> ws(s) is always a permitted scheme change.
        let _ = url.set_scheme(scheme);
        url.query_pairs_mut().append_pair("video_id", video_id);
        url
    }

    pub fn download_url(&self, filename: &str) -> Url {
        self.endpoint(&["download", filename])
    }

    pub fn video_url(&self, filename: &str) -> Url {
        self.endpoint(&["video", filename])
    }

    /// Inline playback location for the URL reported on completion, which may
    /// be relative to the server.
    pub fn playback_url(&self, enhanced_video_url: &str) -> Option<Url> {
        self.base.join(enhanced_video_url).ok()
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        url.set_query(None);
        url.set_fragment(None);
        // http(s) URLs always have a path to extend.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}
