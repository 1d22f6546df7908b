//! MQTT worker
//!
//! Drives the rumqttc event loop, subscribes to the outdoor topics on every
//! (re)connect and feeds incoming publications to the [`Ingress`]. rumqttc
//! reconnects on the next poll after an error; the worker only waits a
//! moment in between so a dead broker does not spin the CPU. The worker
//! returns once a DISCONNECT requested through the client has been sent.

use std::time::Duration;

use log::{debug, error, info};
use meteo_core::config::BrokerConfig;
use meteo_core::ingress::Ingress;
use rumqttc::{
    AsyncClient, ConnAck, ConnectReturnCode, ConnectionError, Event, EventLoop, MqttOptions,
    Outgoing, Packet, QoS, SubscribeFilter,
};

const REQUEST_CAPACITY: usize = 16;
const RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// Create the client handle and the event loop for `broker`.
pub fn connect(broker: &BrokerConfig) -> (AsyncClient, EventLoop) {
    let mut options = MqttOptions::new(broker.client_id, broker.host, broker.port);
    options.set_keep_alive(broker.keep_alive);
    options.set_clean_session(true);

    info!(
        "Connecting to broker {}:{} as {}",
        broker.host, broker.port, broker.client_id
    );
    AsyncClient::new(options, REQUEST_CAPACITY)
}

/// Poll the event loop until the client disconnects.
pub async fn run(client: AsyncClient, mut eventloop: EventLoop, ingress: Ingress) {
    let filters: Vec<SubscribeFilter> = ingress
        .topics()
        .paths()
        .map(|path| SubscribeFilter::new(path.to_owned(), QoS::AtMostOnce))
        .collect();

    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(ConnAck {
                code: ConnectReturnCode::Success,
                ..
            }))) => {
                ingress.on_connected();
                if let Err(e) = client.subscribe_many(filters.clone()).await {
                    error!("Failed to queue subscriptions: {}", e);
                }
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                // Rejected payloads are logged and counted by the ingress.
                let _ = ingress.on_message(&publish.topic, &publish.payload);
            }
            Ok(Event::Outgoing(Outgoing::Disconnect)) => {
                info!("Disconnected from broker");
                ingress.on_disconnect();
                return;
            }
            Ok(event) => debug!("MQTT event: {:?}", event),
            Err(ConnectionError::ConnectionRefused(code)) => {
                ingress.on_connection_refused(&format!("{:?}", code));
                tokio::time::sleep(RECONNECT_DELAY).await;
            }
            Err(e) => {
                error!("MQTT connection error: {}", e);
                ingress.on_disconnect();
                tokio::time::sleep(RECONNECT_DELAY).await;
            }
        }
    }
}
