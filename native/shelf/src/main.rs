use std::{error::Error, process::ExitCode};

use anyhow::Result;
use apkshelf::{
    app_dir, build_catalog,
    catalog::HomeSections,
    logging::setup_logging,
    models::AppRecord,
    settings::SettingsHandler,
    utils::{
        data_safety_lines, format_downloads, format_file_size, format_updated_at, histogram_shares,
    },
    view::{DetailState, Shelf},
};
use mimalloc::MiMalloc;
use tracing::{error, info};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(e) => {
            error!(error = e.as_ref() as &dyn Error, "Fatal error");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<ExitCode> {
    let app_dir = app_dir()?;
    fs_err::create_dir_all(&app_dir)?;

    let _guard = match setup_logging(&app_dir.join("logs")) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Failed to setup logging: {e:#}");
            None
        }
    };

    info!(app_dir = %app_dir.display(), "Starting apkshelf");

    let settings = SettingsHandler::new(&app_dir).load_or_default();
    let catalog = build_catalog(&settings)?;
    let mut shelf = Shelf::new(catalog);

    print_home(&shelf.load_home().await);

    let Some(id) = std::env::args().nth(1) else {
        return Ok(ExitCode::SUCCESS);
    };

    println!();
    match shelf.select_app(&id).await {
        DetailState::Showing(app) => {
            print_detail(app);
            Ok(ExitCode::SUCCESS)
        }
        DetailState::Failed { message } => {
            eprintln!("{message}");
            Ok(ExitCode::FAILURE)
        }
        DetailState::Browsing | DetailState::Loading { .. } => Ok(ExitCode::FAILURE),
    }
}

fn print_home(home: &HomeSections) {
    println!("== Featured ==");
    for app in &home.featured {
        print_summary(app);
    }

    println!("\n== Latest updates ==");
    for app in &home.latest {
        print_summary(app);
    }

    println!("\n== Categories ==");
    for category in &home.categories {
        println!("  [{}] {} ({} apps)", category.icon.as_str(), category.name, category.apps_count);
    }
}

fn print_summary(app: &AppRecord) {
    println!(
        "  {:<24} {:<22} {:.1}★  {}",
        app.name,
        app.developer,
        app.average_rating,
        format_downloads(app.downloads)
    );
}

fn print_detail(app: &AppRecord) {
    println!("{} ({})", app.name, app.slug);
    println!("by {}", app.developer);
    if !app.short_description.is_empty() {
        println!("{}", app.short_description);
    }

    println!();
    println!("  Version       {}", app.version);
    println!("  Size          {}", format_file_size(app.file_size));
    println!("  Requires      Android {}", app.min_android_version);
    println!("  Downloads     {}", format_downloads(app.downloads));
    println!("  Updated       {}", format_updated_at(&app.updated_at));
    println!("  Content       {}", app.content_rating);

    println!("\nWhat's new\n  {}", app.whats_new.replace('\n', "\n  "));

    println!("\nRatings: {:.1} from {} ratings", app.average_rating, app.ratings_count);
    let shares = histogram_shares(&app.histogram);
    for star in (1..=5).rev() {
        let share = shares[star - 1];
        let bar = "#".repeat((share / 5.0).round() as usize);
        println!("  {star}★ {bar:<20} {share:>5.1}%");
    }

    if !app.reviews.is_empty() {
        println!("\nReviews");
        for review in &app.reviews {
            println!("  {} ({}★): {}", review.user, review.rating, review.text);
        }
    }

    println!("\nData safety");
    for line in data_safety_lines(&app.data_safety) {
        println!("  {line}");
    }

    if !app.permissions.is_empty() {
        println!("\nPermissions");
        for (group, entries) in &app.permissions {
            println!("  {group}: {}", entries.join(", "));
        }
    }
}
