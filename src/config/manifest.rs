// TOON manifests for taxonomy args
//
// labels:
//   singular_name: Team
//   plural_name: Teams
// capabilities:
//   assign_terms: edit_users
use crate::config::defaults::{TaxonomyArgs, TaxonomyConfig};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ManifestError {
    #[error("failed to decode TOON taxonomy manifest: {reason}")]
    Decode { reason: String },

    #[error("failed to encode taxonomy config as TOON: {reason}")]
    Encode { reason: String },
}

impl TaxonomyArgs {
    /// Decode partial taxonomy args from a TOON document. Missing sections
    /// and fields stay unset and are filled in by the defaulter.
    pub fn from_toon(input: &str) -> Result<Self, ManifestError> {
        if input.trim().is_empty() {
            return Ok(TaxonomyArgs::default());
        }
        toon_format::decode_default(input).map_err(|source| ManifestError::Decode {
            reason: source.to_string(),
        })
    }
}

impl TaxonomyConfig {
    /// Encode the merged config as TOON, e.g. for review or diffing.
    pub fn to_toon(&self) -> Result<String, ManifestError> {
        toon_format::encode_default(self).map_err(|source| ManifestError::Encode {
            reason: source.to_string(),
        })
    }
}
