//! Analysis prompt commands
//!
//! FinSight sends one prompt per analysis. These commands show what that
//! prompt looks like once the expense text is filled in, check that an
//! override still embeds the text, and print where an override goes.

use std::collections::HashMap;

use anyhow::{bail, Context, Result};
use finsight_core::prompts::{Prompt, PromptId, PromptLibrary, EXPENSES_VAR};

/// Stand-in for the expense text when previewing the prompt
pub const SAMPLE_EXPENSES: &str = "<your expense data>";

/// Print the analysis prompt as it will be sent
pub fn cmd_prompts_show(raw: bool) -> Result<()> {
    let mut library = PromptLibrary::new();
    print!("{}", render_prompt(&mut library, raw)?);
    Ok(())
}

/// Verify the active analysis prompt loads and embeds the expense text
pub fn cmd_prompts_check() -> Result<()> {
    let mut library = PromptLibrary::new();
    println!("{}", check_prompt(&mut library)?);
    Ok(())
}

/// Print the override file location for the analysis prompt
pub fn cmd_prompts_path() -> Result<()> {
    let library = PromptLibrary::new();
    let Some(path) = library.override_file(PromptId::AnalyzeExpenses) else {
        bail!("Could not determine the data directory on this system");
    };

    println!("{}", path.display());
    if !path.exists() {
        eprintln!();
        eprintln!("No override yet. Start from `finsight prompts show --raw`, add the");
        eprintln!("frontmatter (id, version, task_type) and keep {{{{{}}}}} in the", EXPENSES_VAR);
        eprintln!("# User section.");
    }
    Ok(())
}

/// Header line plus either the raw template or a preview with sample data
pub fn render_prompt(library: &mut PromptLibrary, raw: bool) -> Result<String> {
    let prompt = library
        .get(PromptId::AnalyzeExpenses)
        .context("Failed to load the analysis prompt")?;

    let body = if raw {
        prompt.content.clone()
    } else {
        let mut vars = HashMap::new();
        vars.insert(EXPENSES_VAR, SAMPLE_EXPENSES);
        prompt.render_user(&vars)
    };

    Ok(format!("{}\n\n{}\n", describe(prompt), body))
}

/// One-line verdict on the active prompt; loading fails if it is unusable
pub fn check_prompt(library: &mut PromptLibrary) -> Result<String> {
    let prompt = library
        .get(PromptId::AnalyzeExpenses)
        .context("Analysis prompt is not usable")?;
    Ok(format!(
        "✅ {}: embeds {{{{{}}}}}",
        describe(prompt),
        EXPENSES_VAR
    ))
}

fn describe(prompt: &Prompt) -> String {
    let source = match prompt.override_path {
        Some(ref path) => format!("override {}", path.display()),
        None => "embedded".to_string(),
    };
    format!(
        "📝 {} v{} ({})",
        prompt.metadata.id, prompt.metadata.version, source
    )
}
