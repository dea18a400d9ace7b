use clap::{Arg, ArgAction, Command};
use element_waits::core::Locator;
use element_waits::{ChromeSession, ConditionalWait, Config, ElementFinder, ElementStateProvider};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let matches = Command::new("element-waits")
        .about("Report the state of the elements matching a locator on a page")
        .arg(Arg::new("url").required(true).help("Page to open"))
        .arg(
            Arg::new("locator")
                .required(true)
                .help("CSS selector, or XPath with --xpath"),
        )
        .arg(
            Arg::new("xpath")
                .long("xpath")
                .action(ArgAction::SetTrue)
                .help("Treat the locator as XPath"),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .value_parser(clap::value_parser!(u64))
                .help("Wait timeout in milliseconds (defaults to the condition timeout)"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("JSON settings file"),
        )
        .get_matches();

    let config = match matches.get_one::<String>("config") {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    let url = matches
        .get_one::<String>("url")
        .ok_or("url is required")?;
    let raw_locator = matches
        .get_one::<String>("locator")
        .ok_or("locator is required")?;
    let locator = if matches.get_flag("xpath") {
        Locator::xpath(raw_locator.as_str())
    } else {
        Locator::css(raw_locator.as_str())
    };
    let timeout = matches
        .get_one::<u64>("timeout")
        .map(|ms| Duration::from_millis(*ms))
        .unwrap_or_else(|| config.timeouts.condition());

    let session = Arc::new(ChromeSession::launch(&config.browser, &config.timeouts)?);
    info!("Navigating to {}", url);
    session.navigate(url)?;

    let finder = ElementFinder::new(session, ConditionalWait::new(config.timeouts.clone()));
    let state = ElementStateProvider::new(locator, finder);

    info!("Locator: {}", state.locator());
    info!("  exists:    {}", state.is_exist().await?);
    info!("  displayed: {}", state.is_displayed().await?);

    match state.wait_for_displayed(timeout).await {
        Ok(true) => info!("  displayed within {} ms", timeout.as_millis()),
        Ok(false) => {
            info!("  not displayed within {} ms", timeout.as_millis());
            let gone = state.wait_for_not_exist(timeout).await?;
            info!("  absent within {} ms: {}", timeout.as_millis(), gone);
        }
        Err(e) => {
            error!("Browser session failed: {}", e);
            return Err(e.into());
        }
    }

    Ok(())
}
