//! `extract_user_profile_info` tool

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

use super::{ProfileExtractor, ProfileStore};
use crate::core::{Result, SwitchboardError, ToolCall, ToolDefinition, ToolResult};
use crate::tools::registry::{ToolContext, ToolHandler};

pub const PROFILE_TOOL: &str = "extract_user_profile_info";

/// Extracts profile facts from a message and merges them into the caller's profile
pub struct ProfileTool {
    extractor: ProfileExtractor,
    store: Arc<ProfileStore>,
}

impl ProfileTool {
    pub fn new(extractor: ProfileExtractor, store: Arc<ProfileStore>) -> Self {
        Self { extractor, store }
    }

    pub fn definition() -> ToolDefinition {
        ToolDefinition::function(
            PROFILE_TOOL,
            "Extracts personal user information (name, field of study, age, gender, likes) \
             from a natural language message and updates the user's long-term profile. \
             Returns the updated profile.",
            json!({
                "type": "object",
                "properties": {
                    "message": {
                        "type": "string",
                        "description": "The user's message containing personal information"
                    }
                },
                "required": ["message"]
            }),
        )
    }
}

#[async_trait]
impl ToolHandler for ProfileTool {
    async fn invoke(&self, call: &ToolCall, ctx: &ToolContext) -> Result<ToolResult> {
        let message = call
            .get_string("message")
            .filter(|m| !m.trim().is_empty())
            .ok_or_else(|| SwitchboardError::tool("Missing argument 'message'"))?;

        match self.extractor.extract(&message).await {
            Ok(update) => {
                let profile = self.store.update(&ctx.user_id, &update).await?;
                Ok(ToolResult::success(
                    PROFILE_TOOL,
                    serde_json::to_string_pretty(&profile)?,
                ))
            }
            Err(SwitchboardError::Extraction {
                message,
                raw_response,
            }) => {
                tracing::warn!(error = %message, "Profile extraction failed; profile unchanged");
                let output = json!({
                    "error": format!("Failed to parse user profile info: {}", message),
                    "raw_response": raw_response,
                });
                Ok(ToolResult::failure(PROFILE_TOOL, output.to_string()))
            }
            Err(other) => Err(other),
        }
    }
}
