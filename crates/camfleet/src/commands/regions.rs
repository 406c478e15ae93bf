//! Region command handler.

use tabled::Tabled;

use camfleet_core::Region;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::{AppContext, ensure_session};

#[derive(Tabled)]
struct RegionRow {
    #[tabled(rename = "Region")]
    name: String,
}

pub async fn handle(app: &AppContext, global: &GlobalOpts) -> Result<(), CliError> {
    ensure_session(app, "/regions").await?;

    app.store.refresh_regions().await?;
    let regions = app.store.regions_snapshot();

    output::emit_list(
        &global.output,
        global.quiet,
        &regions,
        |r: &Region| RegionRow {
            name: r.name().to_owned(),
        },
        |r| r.name().to_owned(),
    );
    Ok(())
}
