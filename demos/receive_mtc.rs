use futures::StreamExt;
use mtc_sync::{
    FrameRate, MtcCodec, MtcFrameRate, Receiver, ReceiverConfig, ReceiverDelegate,
    ReceiverState, SyncPolicy, Timecode, TimecodeEvent,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::time::{interval, sleep};
use tokio_util::codec::FramedRead;

/// Prints whatever the receiver reports
struct Printer;

impl ReceiverDelegate for Printer {
    fn on_timecode_event(&self, event: &TimecodeEvent) {
        if event.display_needs_update {
            println!("{} ({})", event.timecode, event.direction);
        }
    }

    fn on_state_changed(&self, state: &ReceiverState) {
        println!("-> {}", state);
    }

    fn on_mtc_frame_rate_changed(&self, rate: MtcFrameRate) {
        println!("Incoming rate: {}", rate);
    }
}

/// The eight quarter-frame messages describing `timecode`
fn quarter_frames(timecode: &Timecode, rate: MtcFrameRate) -> Vec<u8> {
    let fields = [
        timecode.frames() as u8,
        timecode.seconds(),
        timecode.minutes(),
        timecode.hours(),
    ];

    let mut bytes = Vec::with_capacity(16);
    for (i, field) in fields.iter().enumerate() {
        let piece = (i * 2) as u8;
        let mut msb = field >> 4;
        if piece == 6 {
            msb = (msb & 0x01) | (rate.bits() << 1);
        }
        bytes.extend_from_slice(&[0xF1, (piece << 4) | (field & 0x0F)]);
        bytes.extend_from_slice(&[0xF1, ((piece + 1) << 4) | msb]);
    }
    bytes
}

#[tokio::main]
async fn main() -> mtc_sync::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let config = ReceiverConfig {
        name: "demo".to_string(),
        local_frame_rate: Some(FrameRate::Fps50),
        sync_policy: SyncPolicy::new(25, 10),
        ..Default::default()
    };

    println!("Receiving 25 fps MTC at local rate {:?}", config.local_frame_rate);
    let receiver = Receiver::new(config, Some(Arc::new(Printer)))?;

    // Fake MIDI port: a transmitter writes raw bytes, the codec reads them back
    let (mut port_out, port_in) = tokio::io::duplex(256);

    let transmitter = tokio::spawn(async move {
        let rate = MtcFrameRate::Mtc25;
        let mut timecode = Timecode::from_hmsf(10, 0, 0, 0, rate.direct_equivalent_frame_rate());
        // Quarter frames go out at four per frame
        let mut ticker = interval(Duration::from_millis(10));

        for _ in 0..50 {
            for pair in quarter_frames(&timecode, rate).chunks(2) {
                ticker.tick().await;
                port_out.write_all(pair).await?;
            }
            timecode = timecode.advanced(2);
        }
        Ok::<_, std::io::Error>(())
    });

    let mut messages = FramedRead::new(port_in, MtcCodec::new());
    while let Some(message) = messages.next().await {
        receiver.consume(message?)?;
    }

    transmitter.await.map_err(|e| mtc_sync::Error::message(e.to_string()))??;

    // Let the receiver notice the stream stopped
    sleep(Duration::from_millis(500)).await;
    println!("Final state: {}, timecode {}", receiver.state(), receiver.timecode());

    receiver.shutdown()
}
