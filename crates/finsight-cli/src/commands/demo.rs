//! Demo command implementation

use anyhow::Result;
use finsight_core::demo::DEMO_CSV;

/// Print the bundled sample statement
pub fn cmd_demo() -> Result<()> {
    println!("{}", DEMO_CSV);
    eprintln!();
    eprintln!("Try: finsight analyze --demo");
    Ok(())
}
