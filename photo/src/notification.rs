use std::sync::{Arc, PoisonError, RwLock, Weak};

use tokio::sync::broadcast;
use tracing::trace;

use crate::photo::Photo;

pub const PHOTO_LOADING_DID_END_NOTIFICATION: &str = "photo-loading-did-end";

const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
pub enum PhotoNotification {
    /// A load started by `load_image_and_notify` has finished, whether or
    /// not it produced an image.
    LoadingDidEnd(Arc<Photo>),
}

impl PhotoNotification {
    pub fn name(&self) -> &'static str {
        match self {
            PhotoNotification::LoadingDidEnd(_) => PHOTO_LOADING_DID_END_NOTIFICATION,
        }
    }

    pub fn photo(&self) -> &Arc<Photo> {
        match self {
            PhotoNotification::LoadingDidEnd(photo) => photo,
        }
    }

    fn downgrade(&self) -> PhotoEvent {
        PhotoEvent {
            name: self.name(),
            photo: Arc::downgrade(self.photo()),
        }
    }
}

/// A notification as seen by channel subscribers. The photo is held weakly,
/// so a message sitting unread in the channel never keeps its photo alive.
#[derive(Debug, Clone)]
pub struct PhotoEvent {
    name: &'static str,
    photo: Weak<Photo>,
}

impl PhotoEvent {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The photo, if anything still owns it.
    pub fn photo(&self) -> Option<Arc<Photo>> {
        self.photo.upgrade()
    }
}

type Observer = Arc<dyn Fn(&PhotoNotification) + Send + Sync>;

/// Fan-out point for photo notifications. Observers run synchronously on
/// the thread that posts, which is always the UI context; channel
/// subscribers receive a [`PhotoEvent`] whenever they next poll.
#[derive(Clone)]
pub struct NotificationCenter {
    sender: broadcast::Sender<PhotoEvent>,
    observers: Arc<RwLock<Vec<Observer>>>,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationCenter {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);

        Self {
            sender,
            observers: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PhotoEvent> {
        self.sender.subscribe()
    }

    pub fn add_observer(&self, observer: impl Fn(&PhotoNotification) + Send + Sync + 'static) {
        self.observers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(observer));
    }

    pub fn post(&self, notification: PhotoNotification) {
        trace!("Posting {}", notification.name());

        // observers may register more observers, don't hold the lock while calling out
        let observers = self
            .observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        for observer in observers {
            observer(&notification);
        }

        // no subscribers is fine, the observers above may be the only audience
        let _ = self.sender.send(notification.downgrade());
    }
}
