use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use markstyle::cli::{report, CliArgs};
use markstyle::coordinator::{StyleCoordinator, StyleMsg, StylingState, ThreadScheduler};
use markstyle::storage::AttributedText;
use markstyle::style::{load_profile, FontFamily, FontdueMetrics, StyleConfiguration};

fn main() -> Result<()> {
    markstyle::tracing::init();

    let run = CliArgs::parse().into_config()?;

    let text = std::fs::read_to_string(&run.file)
        .with_context(|| format!("Failed to read {}", run.file.display()))?;
    let profile = load_profile(&run.engine.style)?;

    let mut metrics = FontdueMetrics::new();
    if let Some(font) = &run.font {
        let data =
            std::fs::read(font).with_context(|| format!("Failed to read {}", font.display()))?;
        metrics.register(FontFamily::SansSerif, &data)?;
    }
    let style = Arc::new(StyleConfiguration::new(profile, &metrics));

    let mut storage = AttributedText::new(&text);
    let (mut scheduler, timers) = ThreadScheduler::new();
    let mut coordinator = StyleCoordinator::new(style, run.engine.scheduling);

    coordinator.update(&mut storage, &mut scheduler, StyleMsg::Load);
    // Chunks arrive on this thread; only it writes to the buffer
    while coordinator.state() != StylingState::Idle {
        let Ok(timer) = timers.recv() else {
            break;
        };
        coordinator.update(&mut storage, &mut scheduler, StyleMsg::TimerFired(timer));
    }
    storage.take_edits();

    tracing::info!("Styled {} with {:?}", run.file.display(), coordinator.stats());
    print!("{}", report(&storage, coordinator.stats(), run.json)?);
    Ok(())
}
