//! RustCmdPipeline - entry point.
//!
//! Wires the pipeline to a platform:
//! - On ESP-IDF the consumer runs as its own task and the main task feeds
//!   console bytes into the channel (the IDF VFS routes stdin/stdout over
//!   the console UART).
//! - On the host a scripted byte stream exercises the whole pipeline:
//!   noise, valid frames, and malformed frames.

use std::io::Write as _;

use rust_serial_cmd_pipeline::{
    tx_println, AppState, ByteChannel, ByteSink, CommandPipeline, LinkStats, PipelineConfig,
    PipelineEvent, RecvTimeout, SendResult, TxGate,
};

/// Sink writing through the process stdout.
///
/// On ESP-IDF this ends up on the console UART; stdout itself is not
/// multi-task safe for interleaved writers, which is exactly what the gate
/// exists to serialize.
struct StdoutSink;

impl ByteSink for StdoutSink {
    fn send_byte(&mut self, byte: u8) {
        let _ = std::io::stdout().write_all(&[byte]);
        if byte == b'\n' {
            let _ = std::io::stdout().flush();
        }
    }
}

// Shared structures, const-initialized — no fallible creation at boot.
static RX_CHANNEL: ByteChannel = ByteChannel::new();
static TX_GATE: TxGate<StdoutSink> = TxGate::new(StdoutSink);
static APP_STATE: AppState = AppState::new();
static STATS: LinkStats = LinkStats::new();

/// Count a rejected enqueue. The producer side owns the loss accounting.
fn produce(byte: u8) {
    if RX_CHANNEL.try_send(byte) == SendResult::Dropped {
        STATS.note_rx_dropped();
    }
}

#[cfg(target_os = "espidf")]
fn main() {
    esp_idf_svc::sys::link_patches();

    // Consumer task: owns the assembler, drains the channel.
    std::thread::spawn(|| {
        let mut pipeline = CommandPipeline::new(&RX_CHANNEL, &TX_GATE, &APP_STATE, &STATS);
        pipeline.run();
    });

    // TODO: wire the key GPIOs behind a LineSampler and run the debounce
    // scan task alongside the consumer.

    tx_println!(TX_GATE, "{} ready", rust_serial_cmd_pipeline::VERSION);

    // Producer: console bytes into the channel. On a raw-UART port the same
    // `produce` call moves into the RX interrupt handler — the channel side
    // of it is interrupt-safe as-is.
    let mut stdin = std::io::stdin();
    let mut byte = [0u8; 1];
    loop {
        match std::io::Read::read(&mut stdin, &mut byte) {
            Ok(1) => produce(byte[0]),
            _ => rust_serial_cmd_pipeline::port::sleep_ms(10),
        }
    }
}

#[cfg(not(target_os = "espidf"))]
fn main() {
    // Valid frames, pre-frame noise, and every rejection path.
    const SCRIPT: &[u8] =
        b"noise[PID,1.0,0.5,0.01][LED,ON]garbage[LED,OFF][PID,1][FOO,1,2][STATUS]";

    for &byte in SCRIPT {
        produce(byte);
    }

    let config = PipelineConfig {
        recv_timeout: RecvTimeout::Ticks(2),
        ..PipelineConfig::default()
    };
    let mut pipeline =
        CommandPipeline::with_config(&RX_CHANNEL, &TX_GATE, &APP_STATE, &STATS, config);

    // Drain until the channel runs dry.
    while pipeline.service() != PipelineEvent::Idle {}

    let (p, i, d) = APP_STATE.gains();
    tx_println!(
        TX_GATE,
        "final: P={} I={} D={} LED={}",
        p,
        i,
        d,
        if APP_STATE.led() { "ON" } else { "OFF" }
    );
}
