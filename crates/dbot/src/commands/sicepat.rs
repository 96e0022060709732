//! SiCepat shipment tracking.

use async_trait::async_trait;
use dbot_core::{Command, CommandError, Request, Response};
use tracing::{info, warn};
use web_apis::{SiCepatClient, Waybill};

pub struct SiCepatCommand {
    client: SiCepatClient,
}

impl SiCepatCommand {
    pub fn new(client: SiCepatClient) -> Self {
        Self { client }
    }
}

fn or_dash(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("-")
}

/// Render a waybill as a delivered summary or its last known status.
pub fn describe(waybill: &Waybill) -> String {
    let header = format!(
        "{}\nFrom {} - {} at {}",
        waybill.waybill_number,
        or_dash(&waybill.sender),
        or_dash(&waybill.sender_address),
        or_dash(&waybill.send_date)
    );

    if waybill.delivered() {
        return format!(
            "{} has been Delivered.\n{} : {}",
            header,
            or_dash(&waybill.pod_receiver),
            or_dash(&waybill.pod_receiver_time)
        );
    }

    let status = waybill
        .last_status
        .as_ref()
        .map(|last| {
            let place = last
                .receiver_name
                .as_deref()
                .filter(|name| !name.trim().is_empty())
                .or(last.city.as_deref())
                .unwrap_or("-");
            format!("{}: {}", last.date_time, place)
        })
        .unwrap_or_else(|| "-".into());

    format!("{}\nCurrent status\n{}", header, status)
}

#[async_trait]
impl Command for SiCepatCommand {
    fn name(&self) -> &str {
        "sicepat"
    }

    fn accepted_commands(&self) -> &[&'static str] {
        &["SICEPAT"]
    }

    async fn execute(&self, request: &Request) -> Result<Response, CommandError> {
        let waybill_number = request.args.trim();
        if waybill_number.is_empty() {
            return Ok(Response::failure(
                "Please send the waybill number, e.g. SICEPAT 000123456789",
            ));
        }

        info!("Tracking waybill {}", waybill_number);
        let tracking = match self.client.check_awb(waybill_number).await {
            Ok(tracking) => tracking,
            Err(e) => {
                warn!("SiCepat request failed: {}", e);
                return Ok(Response::failure(format!(
                    "Unable to track {} right now, please try again later.",
                    waybill_number
                )));
            }
        };

        match tracking.result {
            Some(waybill) => Ok(Response::text(describe(&waybill))),
            None => Ok(Response::failure(format!(
                "Waybill {} not found.",
                waybill_number
            ))),
        }
    }
}
