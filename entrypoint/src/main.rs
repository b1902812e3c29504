use std::{collections::HashMap, process::ExitCode, sync::Arc};

use clap::Parser;
use common::content_mode::ContentMode;
use fetcher::config::SessionConfig;
use image_cache::{CacheMode, SharedCache, config::CacheConfig};
use mimalloc::MiMalloc;
use photo::{Photo, PhotoContext, ui_context::ui_context};
use tracing::{debug, error, info, warn};

use crate::logger::configure_logger;

mod logger;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Fetch, decode and cache photos the way a photo browser would.
#[derive(Parser, Debug)]
#[command(name = "photo-loader", version)]
struct Args {
    /// Image URLs, in browsing order
    #[arg(required = true)]
    urls: Vec<String>,

    /// Request header sent with every fetch, as NAME:VALUE (repeatable)
    #[arg(short = 'H', long = "header", value_parser = parse_header)]
    headers: Vec<(String, String)>,

    /// Which cache strategy backs the shared cache: image or request-response
    #[arg(long, default_value = "image")]
    cache_mode: CacheMode,

    /// Don't write fetched photos to the cache or read them back
    #[arg(long)]
    no_cache: bool,

    /// Caption attached to every photo
    #[arg(long)]
    caption: Option<String>,

    /// Layout hint attached to every photo
    #[arg(long, default_value = "aspect-fill")]
    content_mode: ContentMode,
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected NAME:VALUE, got {raw:?}"))?;

    let name = name.trim();
    if name.is_empty() {
        return Err(format!("header name is empty in {raw:?}"));
    }

    Ok((name.to_string(), value.trim().to_string()))
}

fn build_photos(context: &PhotoContext, args: &Args) -> Vec<Arc<Photo>> {
    let headers = (!args.headers.is_empty())
        .then(|| args.headers.iter().cloned().collect::<HashMap<_, _>>());

    args.urls
        .iter()
        .enumerate()
        .map(|(index, url)| {
            let photo = Photo::photo_with_image_url_headers_and_holder(
                context.clone(),
                url,
                headers.clone(),
                None,
            );

            photo.set_index(index);
            photo.set_should_cache_response(!args.no_cache);
            photo.set_content_mode(args.content_mode);
            photo.set_caption(args.caption.clone());

            photo
        })
        .collect()
}

fn describe(photo: &Photo) {
    let url = photo.source_url().unwrap_or_default();

    match photo.image() {
        Some(image) => info!(
            "#{} {}: {}x{} {:?}, {} frame(s), {:?} per loop",
            photo.index(),
            url,
            image.width(),
            image.height(),
            image.format(),
            image.frame_count(),
            image.duration()
        ),
        None => warn!("#{} {}: no image", photo.index(), url),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    configure_logger();

    let args = Args::parse();

    let (ui, mut ui_loop) = ui_context();
    let cache = SharedCache::memory(args.cache_mode, &CacheConfig::from_env());

    let context = match PhotoContext::http(cache, &SessionConfig::from_env(), ui) {
        Ok(context) => context,
        Err(err) => {
            error!("Failed to set up photo loading: {}", err);
            return ExitCode::FAILURE;
        }
    };

    context.notifications.add_observer(|notification| {
        debug!(
            "{} for photo #{}",
            notification.name(),
            notification.photo().index()
        );
    });

    let photos = build_photos(&context, &args);
    let mut pending = 0;

    for photo in &photos {
        photo.check_cache();

        if photo.image().is_some() {
            continue;
        }

        match photo.load_image_and_notify() {
            Some(_) => pending += 1,
            None => warn!(
                "Skipping #{}: {:?} is not a valid URL",
                photo.index(),
                photo.source_url()
            ),
        }
    }

    // every started load posts exactly one notification from a UI job
    while pending > 0 && ui_loop.run_next().await {
        pending -= 1;
    }

    for photo in &photos {
        describe(photo);
    }

    if !args.no_cache {
        let revisited = build_photos(&context, &args);

        let hits = revisited
            .iter()
            .filter(|photo| {
                photo.check_cache();
                photo.image().is_some()
            })
            .count();

        info!(
            "{}/{} photo(s) served from the {} cache on a second pass",
            hits,
            revisited.len(),
            context.cache.mode()
        );
    }

    metrics::shutdown();

    let loaded = photos.iter().filter(|photo| photo.image().is_some()).count();
    if loaded == photos.len() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
