// Campus Events
// Command line entry point

mod cli;

use std::fs;
use std::future::Future;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use chrono::Local;
use clap::Parser;
use env_logger::Env;
use tokio::sync::{mpsc, watch};

use campus_events::models::event::Event;
use campus_events::models::settings::Settings;
use campus_events::models::status::{ClassificationPolicy, DerivedStatus};
use campus_events::services::aggregator::{aggregate, aggregate_with_policy, participation};
use campus_events::services::classifier::classify_event;
use campus_events::services::countdown::{CountdownHandle, CountdownSnapshot};
use campus_events::services::dashboard::{Dashboard, DashboardView};
use campus_events::services::filter::filter_with_policy;
use campus_events::services::scheduler::{StatusScheduler, WakeReason};
use campus_events::services::search_history::SearchHistory;
use campus_events::services::settings::{self as config, default_cache_path, default_history_path};
use campus_events::services::source::{
    parse_events, ApiClient, EventCache, EventFilter, EventSource, SourceError,
};
use campus_events::utils::clock::{system_clock, Clock};
use campus_events::utils::date::{format_long_date, format_short_time};

use cli::{CliArgs, Command, QueryArgs};

/// Where this run reads events from.
enum Backend {
    File(PathBuf),
    Api { client: ApiClient, cache: EventCache },
}

impl Backend {
    fn from_args(args: &CliArgs, settings: &Settings) -> Result<Self> {
        if let Some(path) = &args.file {
            return Ok(Self::File(path.clone()));
        }

        let cache_path = settings.cache_path.clone().unwrap_or_else(default_cache_path);
        Ok(Self::Api {
            client: ApiClient::from_settings(settings)?,
            cache: EventCache::new(cache_path),
        })
    }

    fn is_remote(&self) -> bool {
        matches!(self, Self::Api { .. })
    }

    async fn events(&self, settings: &Settings) -> Result<Vec<Event>> {
        match self {
            Self::File(path) => {
                let data = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read events from {}", path.display()))?;
                parse_events(&data)
                    .with_context(|| format!("Failed to parse events in {}", path.display()))
            }
            Self::Api { client, cache } => {
                let filter = EventFilter::with_limit(settings.page_limit);
                match client.list_events(&filter).await {
                    Ok(events) => {
                        cache.store_best_effort(&events);
                        Ok(events)
                    }
                    Err(err) if err.is_retryable() => {
                        log::warn!("{}; falling back to cached events", err);
                        let cached = cache.load()?;
                        if cached.is_empty() {
                            return Err(user_error(err));
                        }
                        Ok(cached)
                    }
                    Err(err) => Err(user_error(err)),
                }
            }
        }
    }

    async fn event(&self, id: &str, settings: &Settings) -> Result<Event> {
        match self {
            Self::File(_) => self
                .events(settings)
                .await?
                .into_iter()
                .find(|event| event.id == id)
                .ok_or_else(|| anyhow!("No event with id {}", id)),
            Self::Api { client, .. } => client.get_event(id).await.map_err(user_error),
        }
    }
}

fn user_error(err: SourceError) -> anyhow::Error {
    let message = err.user_message();
    anyhow::Error::new(err).context(message)
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = CliArgs::parse();
    let mut settings = config::load(args.config.as_deref())?;
    if let Some(url) = &args.api_url {
        settings.api_base_url = url.clone();
    }

    let policy = if args.ongoing {
        settings.participation_policy()
    } else {
        settings.policy()
    };
    let backend = Backend::from_args(&args, &settings)?;

    match &args.command {
        Command::Stats { user } => run_stats(&backend, &settings, policy, user.as_deref()).await,
        Command::List(query) => run_list(&backend, &settings, policy, query).await,
        Command::Show { id } => run_show(&backend, &settings, policy, id).await,
        Command::Watch { query, countdown } => {
            run_watch(&backend, &settings, policy, query, countdown.as_deref()).await
        }
    }
}

async fn run_stats(
    backend: &Backend,
    settings: &Settings,
    policy: ClassificationPolicy,
    user: Option<&str>,
) -> Result<()> {
    let events = backend.events(settings).await?;
    let now = Local::now();

    let stats = aggregate(&events, now);
    println!("Total:    {}", stats.total);
    println!("Upcoming: {}", stats.upcoming);
    println!("Finished: {}", stats.finished);

    if policy != ClassificationPolicy::Strict {
        let detailed = aggregate_with_policy(&events, now, policy);
        println!("Ongoing:  {}", detailed.ongoing);
    }

    if let Some(user_id) = user {
        let Backend::Api { client, .. } = backend else {
            return Err(anyhow!("Participation statistics need the API (drop --file)"));
        };
        let registrations = client.my_registrations().await.map_err(user_error)?;
        let profile = participation(
            &registrations,
            &events,
            user_id,
            now,
            settings.participation_policy(),
        );
        println!();
        println!("Registered: {}", profile.total);
        println!("  Upcoming: {}", profile.upcoming);
        println!("  Ongoing:  {}", profile.ongoing);
        println!("  Finished: {}", profile.finished);
    }

    Ok(())
}

async fn run_list(
    backend: &Backend,
    settings: &Settings,
    policy: ClassificationPolicy,
    args: &QueryArgs,
) -> Result<()> {
    let events = backend.events(settings).await?;
    let query = args.to_query();

    if !query.text.trim().is_empty() {
        let mut history = SearchHistory::open(default_history_path(), settings.search_history_limit);
        history.add(&query.text);
    }

    let now = Local::now();
    let visible = filter_with_policy(&events, &query, now, policy);
    if visible.is_empty() {
        println!("No events match.");
        return Ok(());
    }

    for event in &visible {
        let status = classify_event(event, now, policy).status;
        println!("{}", event_line(event, status));
    }
    Ok(())
}

async fn run_show(
    backend: &Backend,
    settings: &Settings,
    policy: ClassificationPolicy,
    id: &str,
) -> Result<()> {
    let event = backend.event(id, settings).await?;
    let now = Local::now();
    let status = classify_event(&event, now, policy).status;

    println!("{}", event.name);
    match event.naive_start() {
        Ok(start) => println!(
            "  When:     {} {}",
            format_long_date(start.date()),
            format_short_time(start.time())
        ),
        Err(err) => println!("  When:     {} ({})", event.date, err),
    }
    println!("  Where:    {}", event.location);
    println!("  Category: {}", event.category.display_name());
    println!("  Status:   {}", status.display_name());
    if let Some(label) = countdown_label(&event) {
        println!("  Starts:   {}", label);
    }
    if !event.description.is_empty() {
        println!();
        println!("{}", event.description);
    }
    Ok(())
}

async fn run_watch(
    backend: &Backend,
    settings: &Settings,
    policy: ClassificationPolicy,
    args: &QueryArgs,
    countdown_id: Option<&str>,
) -> Result<()> {
    let clock = system_clock();

    let mut dashboard = Dashboard::new(policy);
    dashboard.set_query(args.to_query());
    dashboard.set_events(backend.events(settings).await?);
    if let Some(view) = dashboard.refresh(clock.now()) {
        print_view(view);
    }

    let (wake_tx, mut wake_rx) = mpsc::unbounded_channel();
    let scheduler = StatusScheduler::from_settings(settings, clock.clone()).with_policy(policy);
    let wake_handle = scheduler.schedule_next_wake(dashboard.events(), move |reason| {
        let _ = wake_tx.send(reason);
    });

    let countdown = match countdown_id {
        Some(id) => {
            let event = dashboard
                .events()
                .iter()
                .find(|event| event.id == id)
                .cloned()
                .ok_or_else(|| anyhow!("No event with id {}", id))?;
            println!("Counting down to {}", event.name);
            Some(CountdownHandle::for_event(&event, clock.clone(), settings.countdown_tick()))
        }
        None => None,
    };
    let mut countdown_rx: Option<watch::Receiver<CountdownSnapshot>> =
        countdown.as_ref().map(CountdownHandle::subscribe);

    log::info!("Watching {} events, press Ctrl-C to stop", dashboard.events().len());

    loop {
        let countdown_changed = async {
            match countdown_rx.as_mut() {
                Some(rx) => match rx.changed().await {
                    Ok(()) => Some(*rx.borrow_and_update()),
                    Err(_) => None,
                },
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            Some(reason) = wake_rx.recv() => {
                if reason == WakeReason::Fallback && backend.is_remote() {
                    let Some(refreshed) = unless_interrupted(backend.events(settings), ctrl_c()).await else {
                        log::info!("Stopping");
                        break;
                    };
                    match refreshed {
                        Ok(events) => {
                            dashboard.set_events(events);
                            wake_handle.update_events(dashboard.events());
                        }
                        Err(err) => log::warn!("Refresh failed: {:#}", err),
                    }
                }
                if let Some(view) = dashboard.refresh(clock.now()) {
                    print_view(view);
                }
            }
            update = countdown_changed => match update {
                Some(snapshot) => match snapshot.label() {
                    Some(label) => println!("  {}", label),
                    None => println!("  Started"),
                },
                // The countdown task has finished.
                None => countdown_rx = None,
            },
            _ = ctrl_c() => {
                log::info!("Stopping");
                break;
            }
        }
    }

    drop(countdown);
    drop(wake_handle);
    Ok(())
}

async fn ctrl_c() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        log::warn!("Cannot listen for Ctrl-C: {}", err);
        std::future::pending::<()>().await;
    }
}

/// Run `work` unless `interrupt` completes first.
async fn unless_interrupted<T>(
    work: impl Future<Output = T>,
    interrupt: impl Future<Output = ()>,
) -> Option<T> {
    tokio::select! {
        output = work => Some(output),
        _ = interrupt => None,
    }
}

fn print_view(view: &DashboardView) {
    let stats = view.statistics;
    println!(
        "[{}] {} events: {} upcoming, {} finished",
        Local::now().format("%H:%M:%S"),
        stats.total,
        stats.upcoming,
        stats.finished
    );
    for visible in &view.visible {
        println!("  {}", event_line(&visible.event, visible.status));
    }
}

fn event_line(event: &Event, status: DerivedStatus) -> String {
    let mut line = format!(
        "{:<9} {} {:<5} {} ({})",
        status.display_name(),
        event.date,
        event.time.as_deref().unwrap_or(""),
        event.name,
        event.category.display_name()
    );
    if !event.location.is_empty() {
        line.push_str(&format!(" @ {}", event.location));
    }
    if let Some(label) = countdown_label(event) {
        line.push_str(&format!(" - {}", label));
    }
    line
}

fn countdown_label(event: &Event) -> Option<String> {
    let target = event.instant().ok()?;
    CountdownSnapshot::at(target, Local::now()).label()
}
