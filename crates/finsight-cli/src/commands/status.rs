//! Status command implementation

use anyhow::Result;
use finsight_core::prompts::{PromptId, PromptLibrary};
use finsight_core::settings::default_config_path;
use finsight_core::{AIBackend, AIClient};

use super::build_requestor;

/// Show AI backend configuration and check connectivity
pub async fn cmd_status(model: Option<&str>) -> Result<()> {
    let requestor = build_requestor(model)?;
    let client = requestor.client();
    let settings = requestor.settings();

    println!();
    println!("🧠 FinSight Status");
    println!("   ─────────────────────────────");
    println!("   Backend:      {}", client.backend_name());
    println!("   Model:        {}", client.model());
    println!("   Host:         {}", client.host());
    println!("   Temperature:  {}", settings.temperature);
    println!("   Timeout:      {}s", settings.timeout.as_secs());
    println!(
        "   Web search:   {}",
        if settings.web_search { "enabled" } else { "disabled" }
    );

    if let AIClient::Gemini(gemini) = client {
        if gemini.has_api_key() {
            println!("   API key:      ✓ set");
        } else {
            println!("   API key:      ⚠️  not set (export GEMINI_API_KEY=...)");
        }
    }

    match default_config_path() {
        Some(path) if path.exists() => println!("   Config:       {} (override)", path.display()),
        Some(path) => println!("   Config:       embedded (override at {})", path.display()),
        None => println!("   Config:       embedded"),
    }

    match PromptLibrary::new().get(PromptId::AnalyzeExpenses) {
        Ok(prompt) if prompt.is_override => println!("   Prompt:       override v{}", prompt.metadata.version),
        Ok(prompt) => println!("   Prompt:       embedded v{}", prompt.metadata.version),
        Err(e) => println!("   Prompt:       ❌ {}", e),
    }

    println!();
    print!("   Checking backend availability... ");
    if client.health_check().await {
        println!("✅ Connected");
    } else {
        println!("❌ Failed");
        println!();
        println!("   ⚠️  Could not reach {} with model {}", client.host(), client.model());
    }

    Ok(())
}
