//! BLE bridge UART link
//!
//! RX: bridge records → fragments → reassembled messages → events.
//! TX: outbound payloads → notify records.

use defmt::*;
use embassy_rp::uart::{BufferedUartRx, BufferedUartTx};
use embedded_io_async::{Read, Write};

use inkwatch_core::state::Event;
use inkwatch_protocol::{
    decode, encode_notify, Accumulator, BridgeParser, LinkRecord, MAX_RECORD_LEN,
};

use crate::channels::{post, OUTBOUND};

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 64;

/// Link RX task - parses bridge records and reassembles messages
#[embassy_executor::task]
pub async fn link_rx_task(mut rx: BufferedUartRx) {
    info!("Link RX task started");

    let mut parser = BridgeParser::new();
    let mut accumulator = Accumulator::new();
    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        match rx.read(&mut buf).await {
            Ok(n) => {
                for &byte in &buf[..n] {
                    match parser.feed(byte) {
                        Ok(Some(record)) => handle_record(record, &mut accumulator),
                        Ok(None) => {}
                        Err(e) => warn!("Bridge record error: {:?}", e),
                    }
                }
            }
            Err(e) => {
                warn!("UART read error: {:?}", e);
            }
        }
    }
}

fn handle_record(record: LinkRecord, accumulator: &mut Accumulator) {
    match record {
        LinkRecord::Fragment(fragment) => match accumulator.accumulate(&fragment) {
            Ok(Some(message)) => match decode(&message) {
                Ok(command) => {
                    debug!("Command: {}", command);
                    match Event::from_command(command) {
                        Some(event) => post(event),
                        None => debug!("Command has no handler"),
                    }
                }
                Err(e) => warn!("Failed to decode message: {:?}", e),
            },
            Ok(None) => trace!(
                "Fragment buffered ({}/{} bytes)",
                accumulator.received_len(),
                accumulator.expected_len()
            ),
            Err(e) => warn!("Dropping fragment: {:?}", e),
        },
        LinkRecord::Connected => {
            info!("Client connected");
            accumulator.reset();
            post(Event::ClientConnected);
        }
        LinkRecord::Disconnected => {
            info!("Client disconnected");
            accumulator.reset();
            post(Event::ClientDisconnected);
        }
        LinkRecord::Subscribed => {
            debug!("Client subscribed");
            post(Event::ClientSubscribed);
        }
    }
}

/// Link TX task - wraps outbound payloads in notify records
#[embassy_executor::task]
pub async fn link_tx_task(mut tx: BufferedUartTx) {
    info!("Link TX task started");

    let mut record = [0u8; MAX_RECORD_LEN];

    loop {
        let payload = OUTBOUND.receive().await;
        let len = match encode_notify(&payload, &mut record) {
            Ok(len) => len,
            Err(e) => {
                warn!("Cannot encode notify record: {:?}", e);
                continue;
            }
        };
        if let Err(e) = tx.write_all(&record[..len]).await {
            warn!("UART write error: {:?}", e);
        }
    }
}
