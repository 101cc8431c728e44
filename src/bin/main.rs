// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

use clap::Parser;
use heritage_bookings::notification::{LogMailer, SmtpMailer};
use heritage_bookings::{
    AccessPolicy, AppState, BookingStore, Config, MailTransport, Notifier, RandomReferenceGenerator,
    RoomCatalog, create_router,
};
use std::process;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    init_tracing();

    let config = Config::parse();

    if let Err(e) = run(config).await {
        error!(error = %e, "server stopped");
        process::exit(1);
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "heritage_bookings=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

async fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let rooms = Arc::new(RoomCatalog::default());

    let transport: Arc<dyn MailTransport> = match config.smtp_settings() {
        Some(smtp) => {
            info!(host = %smtp.host, port = smtp.port, "sending booking emails over SMTP");
            Arc::new(SmtpMailer::new(&smtp)?)
        }
        None => {
            warn!("SMTP_HOST not set, booking emails will only be logged");
            Arc::new(LogMailer)
        }
    };

    let access = config.access_policy();
    if access == AccessPolicy::Open {
        warn!("ADMIN_TOKEN not set, anyone can update or delete bookings");
    }

    let store = Arc::new(BookingStore::with_parts(
        Arc::clone(&rooms),
        Arc::new(RandomReferenceGenerator),
        config.room_capacity,
    ));
    let notifier = Arc::new(Notifier::new(transport, config.mail_settings(), rooms));

    let app = create_router(AppState::new(store, notifier, access));

    let listener = TcpListener::bind(config.bind).await?;
    info!(addr = %listener.local_addr()?, "booking API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
