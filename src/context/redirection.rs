//! Redirection statuses and their HTML bodies.

use http::StatusCode;

/// Kind of redirect sent by [`RequestContext::redirect`](crate::RequestContext::redirect).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RedirectionType {
    /// 301
    MovedPermanently,
    /// 302
    #[default]
    Found,
    /// 303
    SeeOther,
    /// 304
    NotModified,
    /// 307
    TemporaryRedirect,
    /// 308
    PermanentRedirect,
}

impl RedirectionType {
    /// The 3xx status a redirect of this type responds with.
    pub fn status(self) -> StatusCode {
        match self {
            RedirectionType::MovedPermanently => StatusCode::MOVED_PERMANENTLY,
            RedirectionType::Found => StatusCode::FOUND,
            RedirectionType::SeeOther => StatusCode::SEE_OTHER,
            RedirectionType::NotModified => StatusCode::NOT_MODIFIED,
            RedirectionType::TemporaryRedirect => StatusCode::TEMPORARY_REDIRECT,
            RedirectionType::PermanentRedirect => StatusCode::PERMANENT_REDIRECT,
        }
    }

    /// HTML body template; `%s` is replaced with the target uri.
    ///
    /// `NotModified` responses carry no body.
    pub fn html_template(self) -> Option<&'static str> {
        match self {
            RedirectionType::MovedPermanently => Some(
                "This and all future requests should be directed to <a href=\"%s\">this URI</a>.",
            ),
            RedirectionType::Found => {
                Some("The requested resource temporarily resides under <a href=\"%s\">this URI</a>.")
            }
            RedirectionType::SeeOther => Some(
                "The response to the request can be found under <a href=\"%s\">this URI</a> using a GET method.",
            ),
            RedirectionType::NotModified => None,
            RedirectionType::TemporaryRedirect => Some(
                "The request should be repeated with <a href=\"%s\">this URI</a>, but future requests can still use the original URI.",
            ),
            RedirectionType::PermanentRedirect => Some(
                "The request, and all future requests should be repeated using <a href=\"%s\">this URI</a>.",
            ),
        }
    }

    /// Render the body for the given target, if this type has a template.
    pub fn render_body(self, uri: &str) -> Option<String> {
        self.html_template().map(|template| template.replace("%s", uri))
    }
}
