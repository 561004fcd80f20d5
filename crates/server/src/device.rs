//! Device-style facade over the Session Table.
//!
//! Mirrors a character device: a control call (`ioctl`) taking a command,
//! `read` for the wall bitmap, `write` for a move batch, `release` when the
//! owner goes away, and a text view of every slot (`proc_read`).
//!
//! This is the only layer that logs. Every result is still returned to the
//! caller unchanged; the `*_errno` helpers give the negated-errno form an
//! adapter hands back to its client.

use std::fmt;

use mazebox_engine::{Coord, MoveOutcome};
use prost::Message;

use crate::error::{MazeError, errno};
use crate::session::{OwnerId, SlotSnapshot};
use crate::{SessionTable, TableConfig};

// ============================================================================
// Commands
// ============================================================================

/// Control commands accepted by [`MazeDevice::ioctl`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MazeCommand {
    /// Generate a `width x height` maze for the caller.
    Create { width: i32, height: i32 },
    Reset,
    Destroy,
    GetSize,
    /// Apply one relative delta.
    Move(Coord),
    GetPos,
    GetStart,
    GetEnd,
}

impl MazeCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Create { .. } => "create",
            Self::Reset => "reset",
            Self::Destroy => "destroy",
            Self::GetSize => "getsize",
            Self::Move(_) => "move",
            Self::GetPos => "getpos",
            Self::GetStart => "getstart",
            Self::GetEnd => "getend",
        }
    }
}

/// Successful `ioctl` result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    /// Command completed with nothing to report.
    Done,
    /// Command produced a coordinate (or `(width, height)` for `GetSize`).
    Coord(Coord),
}

// ============================================================================
// Device
// ============================================================================

/// A Session Table behind device-style entry points.
pub struct MazeDevice {
    table: SessionTable,
}

impl MazeDevice {
    pub fn new(config: TableConfig) -> Self {
        tracing::info!(
            max_users = config.max_users,
            seeded = config.seed.is_some(),
            "maze device initialized"
        );
        Self {
            table: SessionTable::new(config),
        }
    }

    pub fn table(&self) -> &SessionTable {
        &self.table
    }

    /// Run one control command for `owner`.
    pub fn ioctl(&self, owner: OwnerId, command: MazeCommand) -> Result<Reply, MazeError> {
        let result = self.dispatch(owner, command);
        match &result {
            Ok(_) => match command {
                MazeCommand::Create { width, height } => {
                    tracing::info!(owner, width, height, "maze created");
                }
                MazeCommand::Destroy => tracing::info!(owner, "maze destroyed"),
                _ => tracing::trace!(owner, command = command.name(), "command applied"),
            },
            Err(error) => tracing::debug!(
                owner,
                command = command.name(),
                error = %error,
                "command rejected"
            ),
        }
        result
    }

    fn dispatch(&self, owner: OwnerId, command: MazeCommand) -> Result<Reply, MazeError> {
        let table = &self.table;
        match command {
            MazeCommand::Create { width, height } => {
                table.create(owner, width, height).map(|_| Reply::Done)
            }
            MazeCommand::Reset => table.reset(owner).map(|()| Reply::Done),
            MazeCommand::Destroy => table.destroy(owner).map(|()| Reply::Done),
            MazeCommand::GetSize => table.bounds(owner).map(Reply::Coord),
            MazeCommand::Move(delta) => table.move_by(owner, delta).map(|outcome| {
                if outcome == MoveOutcome::Blocked {
                    tracing::trace!(owner, %delta, "move blocked");
                }
                Reply::Done
            }),
            MazeCommand::GetPos => table.position(owner).map(Reply::Coord),
            MazeCommand::GetStart => table.start(owner).map(Reply::Coord),
            MazeCommand::GetEnd => table.end(owner).map(Reply::Coord),
        }
    }

    /// Wall bitmap of the caller's maze, one byte per cell.
    pub fn read(&self, owner: OwnerId) -> Result<Vec<u8>, MazeError> {
        self.table.wall_bitmap(owner).inspect_err(|error| {
            tracing::debug!(owner, error = %error, "read rejected");
        })
    }

    /// Apply an encoded move batch. Returns the payload length on success.
    pub fn write(&self, owner: OwnerId, payload: &[u8]) -> Result<usize, MazeError> {
        match self.table.apply_move_batch(owner, payload) {
            Ok(deltas) => {
                tracing::trace!(owner, deltas, "move batch applied");
                Ok(payload.len())
            }
            Err(error) => {
                tracing::debug!(owner, len = payload.len(), error = %error, "write rejected");
                Err(error)
            }
        }
    }

    /// The owner closed its handle. Frees its session if it had one.
    pub fn release(&self, owner: OwnerId) {
        if self.table.release(owner) {
            tracing::info!(owner, "maze released on close");
        }
    }

    /// Text view of every slot.
    pub fn proc_read(&self) -> String {
        render_proc(&self.table.snapshot_all())
    }

    /// Every slot as an encoded `MazeSnapshotProto`, for an out-of-process
    /// supervisor.
    pub fn snapshot_bytes(&self) -> Vec<u8> {
        self.table.snapshot_proto().encode_to_vec()
    }
}

// ============================================================================
// errno Mapping
// ============================================================================

/// Negated errno for a control command failure.
pub fn ioctl_errno(error: &MazeError) -> i32 {
    -error.errno()
}

/// Negated errno for a read or write failure.
///
/// A missing session on the data path reports `EBADFD` rather than `ENOENT`.
pub fn data_errno(error: &MazeError) -> i32 {
    match error {
        MazeError::NotFound { .. } => -errno::EBADFD,
        other => -other.errno(),
    }
}

// ============================================================================
// Proc Rendering
// ============================================================================

/// Render a snapshot in the supervisory text format.
///
/// ```text
/// #00: pid 4242 - [5 x 5]: (1, 1) -> (3, 3) @ (1, 1)
/// - 000: #####
/// - 001: #*..#
/// ...
///
/// #01: vacancy
///
/// ```
pub fn render_proc(snapshot: &[SlotSnapshot]) -> String {
    ProcText(snapshot).to_string()
}

struct ProcText<'a>(&'a [SlotSnapshot]);

impl fmt::Display for ProcText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in self.0 {
            let Some(view) = &entry.session else {
                write!(f, "#{:02}: vacancy\n\n", entry.slot)?;
                continue;
            };
            let maze = &view.maze;
            writeln!(
                f,
                "#{:02}: pid {} - [{} x {}]: {} -> {} @ {}",
                entry.slot,
                view.owner,
                maze.bounds.x,
                maze.bounds.y,
                maze.start,
                maze.end,
                maze.current
            )?;
            for (y, row) in maze.rows.iter().enumerate() {
                writeln!(f, "- {y:03}: {row}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionView;
    use mazebox_engine::MazeView;
    use mazebox_wire::{MazeSnapshotProto, encode_move_batch};

    fn device() -> MazeDevice {
        MazeDevice::new(TableConfig {
            max_users: 2,
            seed: Some(99),
            ..Default::default()
        })
    }

    #[test]
    fn test_ioctl_lifecycle() {
        let dev = device();
        assert_eq!(
            dev.ioctl(1, MazeCommand::Create {
                width: 7,
                height: 5
            }),
            Ok(Reply::Done)
        );
        assert_eq!(
            dev.ioctl(1, MazeCommand::GetSize),
            Ok(Reply::Coord(Coord::new(7, 5)))
        );

        let Ok(Reply::Coord(start)) = dev.ioctl(1, MazeCommand::GetStart) else {
            panic!("no start");
        };
        assert_eq!(dev.ioctl(1, MazeCommand::GetPos), Ok(Reply::Coord(start)));

        assert_eq!(
            dev.ioctl(1, MazeCommand::Move(Coord::new(0, -50))),
            Ok(Reply::Done)
        );
        assert_eq!(dev.ioctl(1, MazeCommand::GetPos), Ok(Reply::Coord(start)));

        assert_eq!(dev.ioctl(1, MazeCommand::Reset), Ok(Reply::Done));
        assert_eq!(dev.ioctl(1, MazeCommand::Destroy), Ok(Reply::Done));
        assert_eq!(
            dev.ioctl(1, MazeCommand::GetEnd),
            Err(MazeError::NotFound { owner: 1 })
        );
    }

    #[test]
    fn test_errno_paths() {
        let dev = device();
        let missing = dev.ioctl(3, MazeCommand::Reset).unwrap_err();
        assert_eq!(ioctl_errno(&missing), -errno::ENOENT);

        let missing = dev.read(3).unwrap_err();
        assert_eq!(data_errno(&missing), -errno::EBADFD);

        let missing = dev.write(3, &[0u8; 8]).unwrap_err();
        assert_eq!(data_errno(&missing), -errno::EBADFD);

        dev.ioctl(3, MazeCommand::Create {
            width: 5,
            height: 5,
        })
        .unwrap();
        let duplicate = dev
            .ioctl(3, MazeCommand::Create {
                width: 5,
                height: 5,
            })
            .unwrap_err();
        assert_eq!(ioctl_errno(&duplicate), -errno::EEXIST);

        let malformed = dev.write(3, &[0u8; 5]).unwrap_err();
        assert_eq!(data_errno(&malformed), -errno::EINVAL);

        dev.ioctl(4, MazeCommand::Create {
            width: 5,
            height: 5,
        })
        .unwrap();
        let full = dev
            .ioctl(5, MazeCommand::Create {
                width: 5,
                height: 5,
            })
            .unwrap_err();
        assert_eq!(ioctl_errno(&full), -errno::ENOMEM);
    }

    #[test]
    fn test_read_write_data_path() {
        let dev = device();
        dev.ioctl(8, MazeCommand::Create {
            width: 10,
            height: 6,
        })
        .unwrap();

        let bitmap = dev.read(8).unwrap();
        assert_eq!(bitmap.len(), 60);
        assert!(bitmap[..10].iter().all(|&b| b == 1));

        let payload = encode_move_batch(&[Coord::new(1, 0), Coord::new(-1, 0), Coord::new(0, 0)]);
        assert_eq!(dev.write(8, &payload), Ok(24));
        assert_eq!(dev.write(8, &[]), Ok(0));
    }

    #[test]
    fn test_release_frees_slot() {
        let dev = device();
        dev.ioctl(1, MazeCommand::Create {
            width: 5,
            height: 5,
        })
        .unwrap();
        dev.release(1);
        dev.release(1);
        assert_eq!(dev.table().session_count(), 0);
        assert!(
            dev.ioctl(1, MazeCommand::Create {
                width: 5,
                height: 5
            })
            .is_ok()
        );
    }

    #[test]
    fn test_render_proc_format() {
        let snapshot = vec![
            SlotSnapshot {
                slot: 0,
                session: Some(SessionView {
                    owner: 4242,
                    maze: MazeView {
                        bounds: Coord::new(5, 3),
                        start: Coord::new(1, 1),
                        end: Coord::new(3, 1),
                        current: Coord::new(2, 1),
                        rows: vec!["#####".into(), "#S*E#".into(), "#####".into()],
                        layout_digest: 0,
                    },
                }),
            },
            SlotSnapshot {
                slot: 1,
                session: None,
            },
        ];

        let expected = "\
#00: pid 4242 - [5 x 3]: (1, 1) -> (3, 1) @ (2, 1)
- 000: #####
- 001: #S*E#
- 002: #####

#01: vacancy

";
        assert_eq!(render_proc(&snapshot), expected);
    }

    #[test]
    fn test_proc_read_covers_every_slot() {
        let dev = device();
        dev.ioctl(77, MazeCommand::Create {
            width: 6,
            height: 4,
        })
        .unwrap();
        let text = dev.proc_read();
        assert!(text.starts_with("#00: pid 77 - [6 x 4]: "));
        assert!(text.contains("- 003: ######\n"));
        assert!(text.ends_with("#01: vacancy\n\n"));
    }

    #[test]
    fn test_snapshot_bytes_decode() {
        let dev = device();
        dev.ioctl(5, MazeCommand::Create {
            width: 8,
            height: 8,
        })
        .unwrap();
        let snapshot = MazeSnapshotProto::decode(dev.snapshot_bytes().as_slice()).unwrap();
        assert_eq!(snapshot, dev.table().snapshot_proto());
        assert_eq!(snapshot.occupied_count(), 1);
        assert_eq!(snapshot.slots[0].rows.len(), 8);
    }
}
