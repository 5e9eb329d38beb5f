//! Mobile/desktop user-agent sniffing. Only affects presentation sizing.

use actix_web::HttpRequest;
use regex::Regex;
use std::sync::LazyLock;
use strum::Display;

static MOBILE_UA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)android|iphone|ipod|ipad|tablet|kindle|silk|mobile|blackberry|bb10|opera mini|iemobile|windows phone|webos",
    )
    .expect("mobile user-agent regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum DeviceClass {
    Mobile,
    Desktop,
}

impl DeviceClass {
    /// Phones and tablets are both `Mobile`.
    pub fn from_user_agent(user_agent: &str) -> Self {
        if MOBILE_UA_RE.is_match(user_agent) {
            DeviceClass::Mobile
        } else {
            DeviceClass::Desktop
        }
    }

    pub fn detect(req: &HttpRequest) -> Self {
        let ua = req
            .headers()
            .get(actix_web::http::header::USER_AGENT)
            .and_then(|h| h.to_str().ok())
            .unwrap_or("");
        Self::from_user_agent(ua)
    }

    /// CSS classes for the main content column
    pub fn size_class(self) -> &'static str {
        match self {
            DeviceClass::Mobile => "col-12 d-block d-sm-none",
            DeviceClass::Desktop => "col-11 d-none d-sm-block",
        }
    }
}
