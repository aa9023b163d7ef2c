// SPDX-License-Identifier: MIT

use super::ActionResult;
use crate::elastic::{Client, Method};
use crate::host::Host;
use crate::prelude::*;

pub const MSG_CLUSTER_HEALTH: &str = "Querying cluster health to check connectivity";
pub const SUCC_CONNECTIVITY_TEST: &str = "Connectivity test passed";
pub const ERR_CONNECTIVITY_TEST: &str = "Connectivity test failed";

pub async fn test_connectivity<H: Host>(
    host: &mut H,
    client: &Client,
    result: &mut ActionResult,
) -> Result<(), ConnectorError> {
    super::connecting(host, client);
    host.save_progress(MSG_CLUSTER_HEALTH);

    match client
        .rest_call(Method::Get, "/_cluster/health", &[], None)
        .await
    {
        Ok(response) => {
            if let Some(status) = response.as_ref().and_then(|r| r["status"].as_str()) {
                debug!("Cluster health: {}", status);
            }
            host.save_progress(SUCC_CONNECTIVITY_TEST);
            result.set_success(SUCC_CONNECTIVITY_TEST);
            Ok(())
        }
        Err(err) => {
            error!("{}", err);
            host.save_progress(ERR_CONNECTIVITY_TEST);
            result.set_error(&err);
            result.message = format!("{}. {}", result.message, ERR_CONNECTIVITY_TEST);
            Ok(())
        }
    }
}
