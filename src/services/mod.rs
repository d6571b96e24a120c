// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod checker;
pub mod inactivity;
pub mod notifier;
pub mod stores;
pub mod twilio;

pub use checker::InactivityChecker;
pub use notifier::NotificationService;
pub use stores::{ActivityStore, RecipientStore, UserDirectory};
pub use twilio::{MessagingProvider, TwilioClient};
