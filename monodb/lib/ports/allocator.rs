use crate::PortAllocationError;

use super::{PortProbe, PortSet};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// The highest usable port number.
pub const MAX_PORT: u32 = u16::MAX as u32;

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Finds the lowest `first >= base` such that `first..first + count` holds no reserved port and
/// no port the probe reports as bound.
///
/// The search never extends past port 65535. On a conflict the next candidate starts right after
/// the conflicting port, since every range in between would contain it.
pub fn find_free_block(
    base: u32,
    reserved: &PortSet,
    count: usize,
    probe: &dyn PortProbe,
) -> Result<u16, PortAllocationError> {
    let count32 = u32::try_from(count).unwrap_or(u32::MAX);
    let exhausted = PortAllocationError::NoFreePortFound { base, count };

    if count32 == 0 {
        return u16::try_from(base).map_err(|_| exhausted);
    }

    let mut candidate = base.max(1);
    while candidate
        .checked_add(count32 - 1)
        .is_some_and(|last| last <= MAX_PORT)
    {
        let conflict = (candidate..candidate + count32).find(|&port| {
            reserved.contains(port) || probe.is_bound(port as u16)
        });

        match conflict {
            None => {
                tracing::trace!("found free block of {} ports at {}", count, candidate);
                return Ok(candidate as u16);
            }
            Some(port) => candidate = port + 1,
        }
    }

    Err(exhausted)
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
