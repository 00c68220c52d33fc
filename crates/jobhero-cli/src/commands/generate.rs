//! Commands that call the model.

use std::path::Path;

use anyhow::{Context as _, Result};
use serde::Serialize;
use tracing::{info, warn};

use jobhero_core::{Coerced, EntitlementStore, JobToolkit};

use super::{load_profile, read_text, text_or_file, Context};

fn report<T: Serialize>(ctx: &Context, what: &str, result: &Coerced<T>) -> Result<()> {
    if result.is_degraded() {
        warn!(artifact = what, defaulted = ?result.defaulted, "Response was incomplete, missing fields defaulted");
    }
    ctx.emit(&result.value)
}

pub async fn toolkit(ctx: &Context, profile: &Path) -> Result<()> {
    let input = load_profile(profile)?;
    let orchestrator = ctx.orchestrator()?;

    info!(role = %input.job_role_target, company = %input.company, "Generating toolkit");
    let toolkit = orchestrator.generate_toolkit(&input).await?;

    let usage = orchestrator.usage();
    info!(
        model_calls = usage.model_calls,
        fallback = usage.fallback_generations > 0,
        total_tokens = usage.total_tokens,
        "Toolkit ready"
    );
    report(ctx, "toolkit", &toolkit)
}

pub async fn roadmap(ctx: &Context, profile: &Path, role: Option<&str>, deep: bool) -> Result<()> {
    let input = load_profile(profile)?;
    let role = role.unwrap_or(&input.job_role_target).to_string();
    if role.trim().is_empty() {
        anyhow::bail!("No target role: pass --role or set jobRoleTarget in the profile");
    }

    let orchestrator = ctx.orchestrator()?;
    let roadmap = orchestrator.regenerate_roadmap(&input, &role, deep).await?;
    report(ctx, "roadmap", &roadmap)
}

pub async fn audit(ctx: &Context, resume: &Path, role: &str) -> Result<()> {
    let resume_text = read_text(resume)?;
    let orchestrator = ctx.orchestrator()?;
    let analysis = orchestrator.analyze_resume(&resume_text, role).await?;
    report(ctx, "resume analysis", &analysis)
}

pub async fn interview(
    ctx: &Context,
    question: &str,
    answer: &str,
    role: &str,
    company: &str,
) -> Result<()> {
    let answer = text_or_file(answer)?;
    let orchestrator = ctx.orchestrator()?;
    let feedback = orchestrator
        .analyze_interview_answer(question, &answer, role, company)
        .await?;
    report(ctx, "interview feedback", &feedback)
}

pub async fn extract(ctx: &Context, text: &Path) -> Result<()> {
    let raw = read_text(text)?;
    let orchestrator = ctx.orchestrator()?;
    let profile = orchestrator.extract_profile(&raw).await?;
    report(ctx, "profile", &profile)
}

pub async fn elite(ctx: &Context, profile: &Path, toolkit: Option<&Path>) -> Result<()> {
    let unlocked = ctx
        .entitlements()
        .get()
        .with_context(|| format!("Failed to read {}", ctx.state.display()))?;
    if !unlocked {
        anyhow::bail!("Elite tools require the elite unlock (run `jobhero unlock`)");
    }

    let input = load_profile(profile)?;
    let orchestrator = ctx.orchestrator()?;
    let elite = orchestrator.generate_elite_tools(&input).await?;

    match toolkit {
        Some(path) => {
            let existing: JobToolkit = serde_json::from_str(&read_text(path)?)
                .with_context(|| format!("Failed to parse toolkit {}", path.display()))?;
            report(ctx, "elite tools", &elite.map(|e| existing.with_elite(&e)))
        }
        None => report(ctx, "elite tools", &elite),
    }
}

pub async fn insights(ctx: &Context, company: &str) -> Result<()> {
    if company.trim().is_empty() {
        anyhow::bail!("Company name is empty");
    }

    let orchestrator = ctx.orchestrator()?;
    let insights = orchestrator.fetch_company_insights(company).await?;
    info!(sources = insights.value.sources.len(), "Company research ready");
    report(ctx, "company insights", &insights)
}
