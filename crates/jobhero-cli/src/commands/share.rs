//! Share link encode/decode.

use std::path::Path;

use anyhow::{Context as _, Result};

use jobhero_core::{ResumeTemplate, SharePayload};

use super::{load_profile, read_text, Context};

pub fn encode(
    ctx: &Context,
    resume: &Path,
    profile: Option<&Path>,
    template: &str,
    base_url: &str,
) -> Result<()> {
    let template: ResumeTemplate = template.parse().map_err(anyhow::Error::msg)?;
    ctx.require_template(template)?;

    let contact = profile.map(load_profile).transpose()?.unwrap_or_default();
    let payload = SharePayload {
        resume: read_text(resume)?,
        template,
        name: contact.full_name,
        email: contact.email,
        phone: contact.phone,
        links: contact.linkedin_github,
    };

    let link = payload.to_link(base_url)?;
    ctx.write_text(&link)
}

pub fn decode(ctx: &Context, link: &str) -> Result<()> {
    let payload = SharePayload::from_link(link).context("Not a JobHero share link")?;
    ctx.emit(&payload)
}
