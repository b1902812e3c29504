use std::sync::{Arc, Weak};

use common::decoded_image::DecodedImage;
use fetcher::{request::Request, traits::FetchResponse};
use metrics::{Metrics, put_metric};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use url::Url;

use crate::{
    context::PhotoContext, notification::PhotoNotification, photo::Photo, ui_context::UiContext,
};

impl Photo {
    /// Starts fetching `source_url` on the context's runtime and returns
    /// straight away. Once the fetch settles, successfully or not, the photo
    /// posts exactly one [`PhotoNotification::LoadingDidEnd`] from the UI
    /// context, after committing the new image if there is one.
    ///
    /// Photos without a URL, or with one that does not parse, never start a
    /// load and never notify; `None` is returned for those.
    pub fn load_image_and_notify(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        let source_url = self.source_url.as_deref()?;

        if let Err(err) = Url::parse(source_url) {
            warn!("Not loading malformed photo URL {:?}: {}", source_url, err);
            return None;
        }

        let request = self.request_for(source_url);
        let photo = Arc::downgrade(self);
        let context = self.context.clone();

        Some(self.context.runtime.spawn(load(photo, context, request)))
    }

    /// Posts the finished notification. Only ever runs as a UI context job.
    pub(crate) fn load_image_complete(self: &Arc<Self>) {
        debug_assert!(
            UiContext::is_current(),
            "load_image_complete called off the UI context"
        );

        self.context
            .notifications
            .post(PhotoNotification::LoadingDidEnd(self.clone()));
    }
}

async fn load(photo: Weak<Photo>, context: PhotoContext, request: Request) {
    let result = context.fetcher.fetch(&request).await;

    // the fetch always runs to completion, only the photo side is skipped
    let Some(photo) = photo.upgrade() else {
        debug!("Photo for {} was dropped before its load finished", request.url());
        return;
    };

    let image = match result {
        Ok(response) => decode_and_cache(&photo, &context, request, response).await,
        Err(err) => {
            warn!("Failed to fetch {}: {}", request.url(), err);
            put_metric!(Metrics::PhotoLoadFailed, 1);

            None
        }
    };

    context.ui.dispatch(move || {
        if let Some(image) = image {
            photo.set_image(image);
        }

        photo.load_image_complete();
    });
}

async fn decode_and_cache(
    photo: &Photo,
    context: &PhotoContext,
    request: Request,
    response: FetchResponse,
) -> Option<Arc<DecodedImage>> {
    let FetchResponse {
        metadata,
        raw_bytes,
    } = response;

    let bytes = raw_bytes.clone();
    let decoded = context
        .runtime
        .spawn_blocking(move || DecodedImage::decode(&bytes))
        .await;

    let image = match decoded {
        Ok(Ok(image)) => Arc::new(image),
        Ok(Err(err)) => {
            debug!("Response from {} is not an image: {}", request.url(), err);
            put_metric!(Metrics::PhotoDecodeFailed, 1);

            return None;
        }
        Err(err) => {
            warn!("Decoding {} did not finish: {}", request.url(), err);
            put_metric!(Metrics::PhotoDecodeFailed, 1);

            return None;
        }
    };

    info!(
        "Loaded {} ({}x{}, {} frame(s))",
        request.url(),
        image.width(),
        image.height(),
        image.frame_count()
    );
    put_metric!(Metrics::PhotoLoadSucceeded, 1);

    if photo.should_cache_response() {
        if context.cache.supports_request_fingerprint() {
            context
                .cache
                .set_response_data(raw_bytes, metadata, request);
        } else if let Some(source_url) = photo.source_url() {
            context.cache.set_image(image.clone(), source_url);
        }
    }

    Some(image)
}
