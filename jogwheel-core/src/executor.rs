//! Command executor and serial protocol client
//!
//! Each command runs through
//!
//! ```text
//! Idle → Rendering → Transmitting → AwaitingResponse → Idle
//! ```
//!
//! and yields exactly one classified result: acknowledged, rejected or timed
//! out. Commands are never retried here; the caller decides what to do with
//! a rejection or a timeout.
//!
//! The reply wait is a `select` between reading the serial port one byte at
//! a time and a delay of the configured timeout, so the executor suspends
//! instead of spinning.
//!
//! Whatever is already sitting in the receive buffer before a command goes
//! out belongs to an earlier command (typically the late `ok` of a homing
//! cycle that timed out) and is discarded unread.

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embedded_hal_async::delay::DelayNs;
use embedded_io_async::{Read, Write};

use jogwheel_protocol::{
    ErrorCode, Jog, MachineCommand, Reply, ResponseError, ResponseParser, MAX_RESPONSE_LEN,
};

use crate::command::{Action, Command};
use crate::config::JogConfig;
use crate::queue::CommandQueue;

/// Classified outcome of a transmitted command
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProtocolResult {
    /// Controller answered `ok`
    Acknowledged,
    /// Controller answered `error`, with its code
    Rejected(ErrorCode),
    /// No reply line within the timeout, or the reply overflowed the buffer
    TimedOut,
}

/// Failures that prevent a command from being exchanged at all
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ExecError {
    /// Rendered line does not fit the line buffer; nothing was sent
    MalformedRender,
    /// The `Invalid` sentinel was submitted; nothing was sent
    InvalidAction,
    /// Serial port read or write failed
    Io,
}

/// Upper bound on stale bytes dropped before one transmit
const MAX_DISCARD: usize = 4 * MAX_RESPONSE_LEN;

/// Result of executing one command
pub type Outcome = Result<ProtocolResult, ExecError>;

/// Executor progress for the command in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ExecState {
    Idle,
    Rendering,
    Transmitting,
    AwaitingResponse,
}

/// Serial protocol client owning the link to the motion controller
pub struct CommandExecutor<S, D> {
    serial: S,
    delay: D,
    parser: ResponseParser,
    state: ExecState,
    config: JogConfig,
}

impl<S, D> CommandExecutor<S, D>
where
    S: Read + Write,
    D: DelayNs,
{
    /// Create an executor over a serial port and a delay source
    pub fn new(serial: S, delay: D, config: &JogConfig) -> Self {
        Self {
            serial,
            delay,
            parser: ResponseParser::new(),
            state: ExecState::Idle,
            config: *config,
        }
    }

    /// Current state
    pub fn state(&self) -> ExecState {
        self.state
    }

    /// Translate a command record into a controller command
    pub fn translate(&self, command: Command) -> Result<MachineCommand, ExecError> {
        let step = self.config.jog_step_um as i32;
        let distance = (command.arg as i32).saturating_mul(step);

        let machine = match command.action {
            Action::MoveX => MachineCommand::Jog(Jog {
                x_um: distance,
                feed: self.config.xy_feed,
                ..Jog::default()
            }),
            Action::MoveY => MachineCommand::Jog(Jog {
                y_um: distance,
                feed: self.config.xy_feed,
                ..Jog::default()
            }),
            Action::MoveZ => MachineCommand::Jog(Jog {
                z_um: distance,
                feed: self.config.z_feed,
                ..Jog::default()
            }),
            Action::ZeroXy => MachineCommand::SetZero {
                x: true,
                y: true,
                z: false,
            },
            Action::ZeroZ => MachineCommand::SetZero {
                x: false,
                y: false,
                z: true,
            },
            Action::Home => MachineCommand::Home,
            Action::ProbeZ => MachineCommand::Probe(Jog {
                z_um: -self.probe_travel(),
                feed: self.config.probe_feed,
                ..Jog::default()
            }),
            Action::ProbeXy => MachineCommand::Probe(Jog {
                x_um: -self.probe_travel(),
                y_um: -self.probe_travel(),
                feed: self.config.probe_feed,
                ..Jog::default()
            }),
            Action::Invalid => return Err(ExecError::InvalidAction),
        };
        Ok(machine)
    }

    fn probe_travel(&self) -> i32 {
        self.config.probe_travel_um.min(i32::MAX as u32) as i32
    }

    /// Reply timeout for an action
    pub fn timeout_ms(&self, action: Action) -> u32 {
        if action.is_long_running() {
            self.config.motion_timeout_ms
        } else {
            self.config.response_timeout_ms
        }
    }

    /// Render, transmit and await the reply for one command
    pub async fn execute(&mut self, command: Command) -> Outcome {
        self.state = ExecState::Rendering;
        let outcome = self.exchange(command).await;
        self.state = ExecState::Idle;
        outcome
    }

    async fn exchange(&mut self, command: Command) -> Outcome {
        let line = self
            .translate(command)?
            .render()
            .map_err(|_| ExecError::MalformedRender)?;

        self.state = ExecState::Transmitting;
        // Leftovers from an earlier timeout must not answer this command
        self.parser.reset();
        self.discard_pending().await?;
        self.serial
            .write_all(line.as_bytes())
            .await
            .map_err(|_| ExecError::Io)?;
        self.serial.flush().await.map_err(|_| ExecError::Io)?;

        self.state = ExecState::AwaitingResponse;
        let timeout_ms = self.timeout_ms(command.action);
        let Self {
            serial,
            delay,
            parser,
            ..
        } = self;

        match select(read_reply(serial, parser), delay.delay_ms(timeout_ms)).await {
            Either::First(outcome) => outcome,
            Either::Second(()) => Ok(ProtocolResult::TimedOut),
        }
    }

    /// Drop bytes that are already waiting in the receive buffer
    ///
    /// Stops at the first read that would block. Returns the number of bytes
    /// dropped.
    async fn discard_pending(&mut self) -> Result<usize, ExecError> {
        let mut byte = [0u8; 1];
        let mut dropped = 0;
        while dropped < MAX_DISCARD {
            // Reads are polled first, so buffered bytes win over the zero delay
            match select(self.serial.read(&mut byte), self.delay.delay_ns(0)).await {
                Either::First(Ok(0)) | Either::Second(()) => break,
                Either::First(Ok(n)) => dropped += n,
                Either::First(Err(_)) => return Err(ExecError::Io),
            }
        }
        Ok(dropped)
    }

    /// Take the next request from the queue and execute it
    ///
    /// The outcome is handed back to a waiting `submit_blocking` caller when
    /// the request came from one.
    pub async fn serve_next<M: RawMutex, const N: usize>(
        &mut self,
        queue: &CommandQueue<M, N>,
    ) -> (Command, Outcome) {
        let request = queue.dequeue().await;
        let outcome = self.execute(request.command).await;
        if let Some(ticket) = request.ticket {
            queue.complete(ticket, outcome.clone());
        }
        (request.command, outcome)
    }
}

/// Read bytes until a reply line is classified
async fn read_reply<R: Read>(rx: &mut R, parser: &mut ResponseParser) -> Outcome {
    let mut byte = [0u8; 1];
    loop {
        let n = rx.read(&mut byte).await.map_err(|_| ExecError::Io)?;
        if n == 0 {
            return Err(ExecError::Io);
        }

        match parser.feed(byte[0]) {
            Ok(Some(Reply::Ok)) => return Ok(ProtocolResult::Acknowledged),
            Ok(Some(Reply::Error(code))) => return Ok(ProtocolResult::Rejected(code)),
            Ok(None) => {}
            Err(ResponseError::Overflow) => return Ok(ProtocolResult::TimedOut),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;

    use embassy_futures::block_on;
    use embassy_futures::join::join;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;
    use embedded_io_async::{ErrorKind, ErrorType};
    use heapless::Vec;

    /// Serial port that records writes and releases one scripted reply
    /// chunk each time a line is flushed
    struct ScriptedSerial {
        replies: &'static [&'static [u8]],
        released: usize,
        rx: Vec<u8, 256>,
        pos: usize,
        tx: Vec<u8, 256>,
    }

    impl ScriptedSerial {
        fn new(replies: &'static [&'static [u8]]) -> Self {
            Self {
                replies,
                released: 0,
                rx: Vec::new(),
                pos: 0,
                tx: Vec::new(),
            }
        }

        fn written(&self) -> &str {
            core::str::from_utf8(&self.tx).unwrap()
        }
    }

    impl ErrorType for ScriptedSerial {
        type Error = Infallible;
    }

    impl Read for ScriptedSerial {
        async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Infallible> {
            if self.pos >= self.rx.len() {
                // Nothing buffered; controller is quiet
                return core::future::pending().await;
            }
            buf[0] = self.rx[self.pos];
            self.pos += 1;
            Ok(1)
        }
    }

    impl Write for ScriptedSerial {
        async fn write(&mut self, buf: &[u8]) -> Result<usize, Infallible> {
            self.tx.extend_from_slice(buf).unwrap();
            Ok(buf.len())
        }

        async fn flush(&mut self) -> Result<(), Infallible> {
            if let Some(reply) = self.replies.get(self.released) {
                self.rx.extend_from_slice(reply).unwrap();
                self.released += 1;
            }
            Ok(())
        }
    }

    /// Serial port whose writes always fail
    struct BrokenSerial;

    impl ErrorType for BrokenSerial {
        type Error = ErrorKind;
    }

    impl Read for BrokenSerial {
        async fn read(&mut self, _buf: &mut [u8]) -> Result<usize, ErrorKind> {
            Err(ErrorKind::Other)
        }
    }

    impl Write for BrokenSerial {
        async fn write(&mut self, _buf: &[u8]) -> Result<usize, ErrorKind> {
            Err(ErrorKind::Other)
        }
    }

    /// Delay that elapses immediately and remembers what was asked for
    #[derive(Default)]
    struct InstantDelay {
        waited_ms: Option<u32>,
    }

    impl DelayNs for InstantDelay {
        async fn delay_ns(&mut self, _ns: u32) {}

        async fn delay_ms(&mut self, ms: u32) {
            self.waited_ms = Some(ms);
        }
    }

    fn executor(replies: &'static [&'static [u8]]) -> CommandExecutor<ScriptedSerial, InstantDelay> {
        CommandExecutor::new(
            ScriptedSerial::new(replies),
            InstantDelay::default(),
            &JogConfig::default(),
        )
    }

    fn code(s: &str) -> ErrorCode {
        let mut c = ErrorCode::new();
        c.push_str(s).unwrap();
        c
    }

    #[test]
    fn test_acknowledged() {
        let mut exec = executor(&[b"ok\n"]);
        let outcome = block_on(exec.execute(Command::new(Action::MoveY, 25)));

        assert_eq!(outcome, Ok(ProtocolResult::Acknowledged));
        assert_eq!(exec.serial.written(), "$J=G91 Y0.250 F1000\n");
        assert_eq!(exec.state(), ExecState::Idle);
        assert_eq!(exec.delay.waited_ms, None);
    }

    #[test]
    fn test_rejected() {
        let mut exec = executor(&[b"error:9\n"]);
        let outcome = block_on(exec.execute(Command::new(Action::MoveX, -1)));

        assert_eq!(outcome, Ok(ProtocolResult::Rejected(code("9"))));
        assert_eq!(exec.serial.written(), "$J=G91 X-0.010 F1000\n");
    }

    #[test]
    fn test_silence_times_out() {
        let mut exec = executor(&[]);
        let outcome = block_on(exec.execute(Command::new(Action::MoveZ, 10)));

        assert_eq!(outcome, Ok(ProtocolResult::TimedOut));
        assert_eq!(exec.delay.waited_ms, Some(3000));
        assert_eq!(exec.state(), ExecState::Idle);
    }

    #[test]
    fn test_unterminated_line_times_out() {
        let mut exec = executor(&[b"ok"]);
        let outcome = block_on(exec.execute(Command::new(Action::ZeroZ, 0)));
        assert_eq!(outcome, Ok(ProtocolResult::TimedOut));
    }

    #[test]
    fn test_overflow_is_timeout() {
        static FLOOD: [u8; 200] = [b'#'; 200];
        static REPLIES: [&[u8]; 1] = [&FLOOD];
        let mut exec = executor(&REPLIES);
        let outcome = block_on(exec.execute(Command::new(Action::ZeroXy, 0)));

        assert_eq!(outcome, Ok(ProtocolResult::TimedOut));
        // Gave up on the overflow without waiting out the timeout
        assert_eq!(exec.delay.waited_ms, None);
    }

    #[test]
    fn test_status_lines_are_skipped() {
        let mut exec = executor(&[b"<Jog|MPos:1.000,0.000,0.000>\r\n[MSG:hi]\r\nok\r\n"]);
        let outcome = block_on(exec.execute(Command::new(Action::MoveX, 100)));
        assert_eq!(outcome, Ok(ProtocolResult::Acknowledged));
    }

    #[test]
    fn test_fixed_shape_commands() {
        let cases = [
            (Action::ZeroXy, "G10 L20 P0 X0 Y0\n"),
            (Action::ZeroZ, "G10 L20 P0 Z0\n"),
            (Action::Home, "$H\n"),
            (Action::ProbeZ, "G38.2 Z-10.000 F50\n"),
            (Action::ProbeXy, "G38.2 X-10.000 Y-10.000 F50\n"),
        ];

        for (action, expected) in cases {
            let mut exec = executor(&[b"ok\n"]);
            let outcome = block_on(exec.execute(Command::new(action, 0)));
            assert_eq!(outcome, Ok(ProtocolResult::Acknowledged));
            assert_eq!(exec.serial.written(), expected);
        }
    }

    #[test]
    fn test_homing_uses_motion_timeout() {
        let mut exec = executor(&[]);
        let outcome = block_on(exec.execute(Command::new(Action::Home, 0)));

        assert_eq!(outcome, Ok(ProtocolResult::TimedOut));
        assert_eq!(exec.delay.waited_ms, Some(60_000));
    }

    #[test]
    fn test_invalid_is_not_sent() {
        let mut exec = executor(&[b"ok\n"]);
        let outcome = block_on(exec.execute(Command::INVALID));

        assert_eq!(outcome, Err(ExecError::InvalidAction));
        assert!(exec.serial.tx.is_empty());
        assert_eq!(exec.state(), ExecState::Idle);
    }

    #[test]
    fn test_write_failure() {
        let mut exec = CommandExecutor::new(BrokenSerial, InstantDelay::default(), &JogConfig::default());
        let outcome = block_on(exec.execute(Command::new(Action::Home, 0)));
        assert_eq!(outcome, Err(ExecError::Io));
    }

    #[test]
    fn test_stale_partial_line_is_dropped() {
        // "o" arrives and then the controller goes quiet; the next reply
        // starts with "k\n", which must not read as "ok"
        let mut exec = executor(&[b"o", b"k\nok\n"]);
        let first = block_on(exec.execute(Command::new(Action::MoveX, 1)));
        assert_eq!(first, Ok(ProtocolResult::TimedOut));

        let second = block_on(exec.execute(Command::new(Action::MoveX, 1)));
        assert_eq!(second, Ok(ProtocolResult::Acknowledged));
        assert_eq!(exec.serial.pos, exec.serial.rx.len());
    }

    #[test]
    fn test_late_reply_does_not_answer_next_command() {
        let mut exec = executor(&[b"", b"error:3\n"]);
        let homing = block_on(exec.execute(Command::new(Action::Home, 0)));
        assert_eq!(homing, Ok(ProtocolResult::TimedOut));

        // Homing finishes after the executor gave up on it
        exec.serial.rx.extend_from_slice(b"ok\n").unwrap();

        let jog = block_on(exec.execute(Command::new(Action::MoveX, 1)));
        assert_eq!(jog, Ok(ProtocolResult::Rejected(code("3"))));
        assert_eq!(exec.serial.written(), "$H\n$J=G91 X0.010 F1000\n");
    }

    #[test]
    fn test_discard_stops_when_nothing_is_buffered() {
        let mut exec = executor(&[]);
        exec.serial.rx.extend_from_slice(b"ok\nok\n").unwrap();

        assert_eq!(block_on(exec.discard_pending()), Ok(6));
        assert_eq!(block_on(exec.discard_pending()), Ok(0));
        assert_eq!(exec.delay.waited_ms, None);
    }

    #[test]
    fn test_serve_next_runs_in_fifo_order() {
        let queue: CommandQueue<NoopRawMutex, 4> = CommandQueue::new();
        queue.try_enqueue(Command::new(Action::MoveX, 1)).unwrap();
        queue.try_enqueue(Command::new(Action::Home, 0)).unwrap();

        let mut exec = executor(&[b"ok\n", b"error:2\n"]);
        let (first, first_outcome) = block_on(exec.serve_next(&queue));
        let (second, second_outcome) = block_on(exec.serve_next(&queue));

        assert_eq!(first.action, Action::MoveX);
        assert_eq!(first_outcome, Ok(ProtocolResult::Acknowledged));
        assert_eq!(second.action, Action::Home);
        assert_eq!(second_outcome, Ok(ProtocolResult::Rejected(code("2"))));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_submit_blocking_returns_outcome() {
        let queue: CommandQueue<NoopRawMutex, 4> = CommandQueue::new();
        let mut exec = executor(&[b"error:15\n"]);

        let (outcome, (command, _)) = block_on(join(
            queue.submit_blocking(Action::MoveZ, -4),
            exec.serve_next(&queue),
        ));

        assert_eq!(command, Command::new(Action::MoveZ, -4));
        assert_eq!(outcome, Ok(ProtocolResult::Rejected(code("15"))));
    }

    #[test]
    fn test_submit_blocking_skips_earlier_requests() {
        let queue: CommandQueue<NoopRawMutex, 4> = CommandQueue::new();
        // Queued from the non-blocking path before the blocking caller
        queue.submit(Action::MoveX, 1).unwrap();
        let mut exec = executor(&[b"ok\n", b"error:1\n"]);

        let (outcome, (earlier, blocking)) = block_on(join(
            queue.submit_blocking(Action::ZeroXy, 0),
            async {
                let earlier = exec.serve_next(&queue).await;
                let blocking = exec.serve_next(&queue).await;
                (earlier, blocking)
            },
        ));

        // The earlier request's "ok" is not handed to the blocking caller
        assert_eq!(
            earlier,
            (Command::new(Action::MoveX, 1), Ok(ProtocolResult::Acknowledged))
        );
        assert_eq!(blocking.0.action, Action::ZeroXy);
        assert_eq!(outcome, Ok(ProtocolResult::Rejected(code("1"))));
    }
}
