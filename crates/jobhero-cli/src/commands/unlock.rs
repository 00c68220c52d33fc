//! Elite unlock and status.

use std::path::Path;

use anyhow::{Context as _, Result};
use serde::Serialize;
use tracing::info;

use jobhero_core::{template_access, EntitlementStore, ResumeTemplate, TemplateAccess, UserInput};
use jobhero_runtime::{unlock_entitlement, CheckoutRequest, SimulatedGateway};

use super::{load_profile, Context};

pub async fn unlock(ctx: &Context, profile: Option<&Path>) -> Result<()> {
    let store = ctx.entitlements();
    if store.get()? {
        info!("Elite unlock already active");
        return status(ctx);
    }

    let input = profile.map(load_profile).transpose()?.unwrap_or_else(UserInput::default);
    let request = CheckoutRequest::elite_unlock(&input);

    let receipt = unlock_entitlement(&SimulatedGateway::approving(), &store, &request)
        .await
        .context("Unlock failed")?;
    ctx.emit(&receipt)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Status {
    unlocked: bool,
    state_file: String,
    templates: Vec<TemplateStatus>,
}

#[derive(Serialize)]
struct TemplateStatus {
    template: ResumeTemplate,
    premium: bool,
    available: bool,
}

pub fn status(ctx: &Context) -> Result<()> {
    let store = ctx.entitlements();
    let unlocked = store
        .get()
        .with_context(|| format!("Failed to read {}", ctx.state.display()))?;

    let templates = ResumeTemplate::ALL
        .iter()
        .map(|&template| {
            Ok(TemplateStatus {
                template,
                premium: template.is_premium(),
                available: template_access(&store, template)? == TemplateAccess::Granted,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    ctx.emit(&Status {
        unlocked,
        state_file: ctx.state.display().to_string(),
        templates,
    })
}
