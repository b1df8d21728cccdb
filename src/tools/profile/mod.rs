//! User profile memory
//!
//! Facts a user states about themselves (name, studies, age, gender, likes)
//! are extracted by a model, normalized, merged into the stored profile and
//! persisted across sessions.

mod extractor;
mod model;
mod store;
mod tool;

pub use extractor::{strip_code_fences, ProfileExtractor};
pub use model::{capitalize, ProfileUpdate, UserProfile};
pub use store::ProfileStore;
pub use tool::{ProfileTool, PROFILE_TOOL};

use std::sync::Arc;

use crate::core::{Result, ToolCategory};
use crate::tools::registry::{ToolRegistry, ToolSpec};

/// Register `extract_user_profile_info`
pub fn register_tools(
    registry: &mut ToolRegistry,
    extractor: ProfileExtractor,
    store: Arc<ProfileStore>,
) -> Result<()> {
    registry.register(ToolSpec::new(
        ProfileTool::definition(),
        ToolCategory::Profile,
        Arc::new(ProfileTool::new(extractor, store)),
    ))
}
