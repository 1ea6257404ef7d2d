use autoload_core::version::BuildInfo;
use miette::{IntoDiagnostic, Result};

pub fn run(json: bool) -> Result<()> {
    let info = BuildInfo::current();
    if json {
        println!("{}", serde_json::to_string(&info).into_diagnostic()?);
    } else {
        println!("{info}");
    }
    Ok(())
}
