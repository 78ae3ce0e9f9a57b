//! Request bodies for `POST /api/v1/favorite`.
//!
//! The service accepts `{"userId": <RFC 4122 UUID>, "favNum": <integer > 0>}`, both
//! fields required. [`FavoriteRequest::random`] produces bodies that satisfy those
//! rules; [`invalid_payloads`] produces the fixed set that each break exactly one.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use uuid::Uuid;

/// Inclusive range `favNum` is drawn from for valid iterations.
pub const FAV_NUM_RANGE: RangeInclusive<i64> = 1..=100;

/// JSON body sent to the favorite endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteRequest {
    pub user_id: String,
    pub fav_num: i64,
}

impl FavoriteRequest {
    pub fn new(user_id: impl Into<String>, fav_num: i64) -> Self {
        Self {
            user_id: user_id.into(),
            fav_num,
        }
    }

    /// Fresh v4 user id and a uniformly drawn `favNum` in `1..=100`.
    pub fn random() -> Self {
        let fav_num = rand::thread_rng().gen_range(FAV_NUM_RANGE);
        Self::new(fresh_user_id(), fav_num)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Which validation rule an invalid payload breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Violation {
    /// `userId` is present but not a UUID
    MalformedUserId,
    /// `favNum` is below zero
    NegativeFavNum,
    /// `favNum` is zero, which the service treats as missing
    ZeroFavNum,
    /// `userId` is the empty string
    EmptyUserId,
}

/// A payload the service must reject with 400, tagged with the rule it breaks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidPayload {
    pub violation: Violation,
    pub request: FavoriteRequest,
}

/// The four probe payloads, in the order they are sent.
///
/// The shape is fixed; only the well-formed user ids in the `favNum` cases are fresh.
pub fn invalid_payloads() -> [InvalidPayload; 4] {
    [
        InvalidPayload {
            violation: Violation::MalformedUserId,
            request: FavoriteRequest::new("invalid-uuid", 42),
        },
        InvalidPayload {
            violation: Violation::NegativeFavNum,
            request: FavoriteRequest::new(fresh_user_id(), -1),
        },
        InvalidPayload {
            violation: Violation::ZeroFavNum,
            request: FavoriteRequest::new(fresh_user_id(), 0),
        },
        InvalidPayload {
            violation: Violation::EmptyUserId,
            request: FavoriteRequest::new("", 42),
        },
    ]
}

fn fresh_user_id() -> String {
    Uuid::new_v4().hyphenated().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn is_v4(id: &str) -> bool {
        id.len() == 36
            && Uuid::parse_str(id)
                .map(|u| u.get_version_num() == 4)
                .unwrap_or(false)
    }

    #[test]
    fn test_random_payload_is_valid() {
        for _ in 0..1_000 {
            let req = FavoriteRequest::random();
            assert!(is_v4(&req.user_id), "not a v4 uuid: {}", req.user_id);
            assert!(FAV_NUM_RANGE.contains(&req.fav_num), "out of range: {}", req.fav_num);
        }
    }

    #[test]
    fn test_random_payload_covers_range_edges() {
        let seen: HashSet<i64> = (0..20_000)
            .map(|_| FavoriteRequest::random().fav_num)
            .collect();
        assert!(seen.contains(&1));
        assert!(seen.contains(&100));
    }

    #[test]
    fn test_random_user_ids_are_fresh() {
        let a = FavoriteRequest::random();
        let b = FavoriteRequest::random();
        assert_ne!(a.user_id, b.user_id);
    }

    #[test]
    fn test_json_uses_camel_case_keys() {
        let json = FavoriteRequest::new("abc", 7).to_json().unwrap();
        assert_eq!(json, r#"{"userId":"abc","favNum":7}"#);
    }

    #[test]
    fn test_random_payloads_share_json_shape() {
        let keys = |req: &FavoriteRequest| {
            let value: serde_json::Value = serde_json::from_str(&req.to_json().unwrap()).unwrap();
            let mut keys: Vec<String> = value.as_object().unwrap().keys().cloned().collect();
            keys.sort();
            keys
        };
        assert_eq!(keys(&FavoriteRequest::random()), keys(&FavoriteRequest::random()));
        assert_eq!(keys(&FavoriteRequest::random()), vec!["favNum", "userId"]);
    }

    #[test]
    fn test_invalid_payloads_break_one_rule_each() {
        let payloads = invalid_payloads();
        assert_eq!(payloads.len(), 4);

        let violations: Vec<Violation> = payloads.iter().map(|p| p.violation).collect();
        assert_eq!(
            violations,
            vec![
                Violation::MalformedUserId,
                Violation::NegativeFavNum,
                Violation::ZeroFavNum,
                Violation::EmptyUserId,
            ]
        );

        for payload in &payloads {
            let id_ok = is_v4(&payload.request.user_id);
            let num_ok = payload.request.fav_num > 0;
            match payload.violation {
                Violation::MalformedUserId => {
                    assert!(!id_ok && !payload.request.user_id.is_empty() && num_ok)
                }
                Violation::EmptyUserId => assert!(payload.request.user_id.is_empty() && num_ok),
                Violation::NegativeFavNum => assert!(id_ok && payload.request.fav_num == -1),
                Violation::ZeroFavNum => assert!(id_ok && payload.request.fav_num == 0),
            }
        }
    }
}
