use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::request::{LaunchRequest, ScreenId};

/// Where the launch screen hands over control. Computed once, never revised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationOutcome {
    pub destination: ScreenId,
    /// Forwarded to the destination as its original request.
    pub payload: LaunchRequest,
    /// The caller is another app waiting for a result.
    pub expects_result: bool,
}

#[derive(Debug, Clone)]
pub struct Router {
    default_destination: ScreenId,
}

impl Router {
    pub fn new(default_destination: ScreenId) -> Self {
        Self {
            default_destination,
        }
    }

    /// Decides the destination for `request`.
    ///
    /// Without an explicit original request the inbound request itself is
    /// forwarded. Any forwarded payload outside the launcher category is
    /// treated as an API call that expects a result.
    pub fn route(&self, request: &LaunchRequest) -> NavigationOutcome {
        let destination = request
            .target
            .clone()
            .unwrap_or_else(|| self.default_destination.clone());
        let payload = match &request.original {
            Some(original) => original.as_ref().clone(),
            None => request.clone(),
        };
        let expects_result = !payload.is_from_launcher();
        debug!(%destination, expects_result, "navigation routed");
        NavigationOutcome {
            destination,
            payload,
            expects_result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Category;

    fn router() -> Router {
        Router::new(ScreenId::new("download_resources"))
    }

    #[test]
    fn bare_request_goes_to_default_and_forwards_itself() {
        let request = LaunchRequest::from_launcher().with_data("geo:0,0");
        let outcome = router().route(&request);
        assert_eq!(outcome.destination.as_str(), "download_resources");
        assert_eq!(outcome.payload, request);
        assert!(!outcome.expects_result);
    }

    #[test]
    fn target_overrides_default_destination() {
        let request = LaunchRequest::from_launcher().with_target("map");
        let outcome = router().route(&request);
        assert_eq!(outcome.destination.as_str(), "map");
    }

    #[test]
    fn original_request_is_forwarded_and_decides_result_mode() {
        let api_call = LaunchRequest::new()
            .with_action("pick_point")
            .with_category(Category::Default);
        let request = LaunchRequest::from_launcher().with_original(api_call.clone());
        let outcome = router().route(&request);
        assert_eq!(outcome.payload, api_call);
        assert!(outcome.expects_result);
    }

    #[test]
    fn launcher_original_inside_non_launcher_request_is_one_way() {
        let request = LaunchRequest::for_launch_screen(
            Some(ScreenId::new("map")),
            Some(LaunchRequest::from_launcher()),
        );
        let outcome = router().route(&request);
        assert_eq!(outcome.destination.as_str(), "map");
        assert!(!outcome.expects_result);
    }

    #[test]
    fn request_without_categories_expects_result() {
        let outcome = router().route(&LaunchRequest::new().with_data("om://search?q=cafe"));
        assert!(outcome.expects_result);
    }
}
