//! Document identifiers.
//!
//! Host documents (actors, combats, chat messages, users) are addressed by
//! opaque string ids. Token placements are addressed by a composite
//! identifier of the fixed shape `Scene.<sceneId>.Token.<tokenId>`, which is
//! also the canonical target identifier stored on activation cards.
//!
//! ```
//! use card_sync::core::{SceneId, TargetId, TokenId};
//!
//! let target = TargetId::for_token(&SceneId::new("abc"), &TokenId::new("xyz"));
//! assert_eq!(target.as_str(), "Scene.abc.Token.xyz");
//!
//! let (scene, token) = target.parts().unwrap();
//! assert_eq!(scene.as_str(), "abc");
//! assert_eq!(token.as_str(), "xyz");
//! ```

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Create a new identifier.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the raw identifier.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }
    };
}

string_id!(
    /// Identifier of an actor (the owner of health and other stats).
    ActorId
);
string_id!(
    /// Identifier of a combat encounter.
    CombatId
);
string_id!(
    /// Identifier of a participant within one combat.
    CombatantId
);
string_id!(
    /// Identifier of a scene.
    SceneId
);
string_id!(
    /// Identifier of a token placement within a scene.
    TokenId
);
string_id!(
    /// Identifier of a connected user.
    UserId
);
string_id!(
    /// Identifier of a chat message (activation card).
    MessageId
);
string_id!(
    /// Composite token identifier used as a card target.
    ///
    /// Well-formed targets have the shape `Scene.<sceneId>.Token.<tokenId>`,
    /// but cards may hold any string; malformed ids simply never resolve.
    TargetId
);

const SCENE_SEGMENT: &str = "Scene";
const TOKEN_SEGMENT: &str = "Token";

impl TargetId {
    /// Build the composite identifier for a token placement.
    #[must_use]
    pub fn for_token(scene: &SceneId, token: &TokenId) -> Self {
        Self(format!("{SCENE_SEGMENT}.{scene}.{TOKEN_SEGMENT}.{token}"))
    }

    /// Split a well-formed composite id into its scene and token parts.
    ///
    /// Returns `None` unless the id has exactly the four segments
    /// `Scene`, scene id, `Token`, token id, with non-empty ids.
    #[must_use]
    pub fn parts(&self) -> Option<(SceneId, TokenId)> {
        let mut segments = self.0.split('.');
        match (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) {
            (Some(SCENE_SEGMENT), Some(scene), Some(TOKEN_SEGMENT), Some(token), None)
                if !scene.is_empty() && !token.is_empty() =>
            {
                Some((SceneId::new(scene), TokenId::new(token)))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_round_trip() {
        let target = TargetId::for_token(&SceneId::new("s1"), &TokenId::new("t1"));
        assert_eq!(target.to_string(), "Scene.s1.Token.t1");
        assert_eq!(
            target.parts(),
            Some((SceneId::new("s1"), TokenId::new("t1")))
        );
    }

    #[test]
    fn test_malformed_targets() {
        for raw in [
            "",
            "Scene.s1",
            "Scene.s1.Token",
            "Scene..Token.t1",
            "Scene.s1.Token.",
            "Actor.a1.Token.t1",
            "Scene.s1.Tile.t1",
            "Scene.s1.Token.t1.Extra",
        ] {
            assert_eq!(TargetId::new(raw).parts(), None, "{raw:?} should not parse");
        }
    }

    #[test]
    fn test_serde_transparent() {
        let id = ActorId::new("actor-1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"actor-1\"");
        let back: ActorId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
