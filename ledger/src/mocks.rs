use anyhow::Context;
use commonware_runtime::{buffer::PoolRef, Clock, Metrics, Spawner, Storage};
use commonware_storage::{adb, translator::EightCap};
use commonware_utils::{NZUsize, NZU64};
use rand::{rngs::StdRng, RngCore, SeedableRng};

use crate::state::{Adb, Memory};
use crate::{Ledger, Limits};

const TEST_BUFFER_POOL_PAGES: usize = 1024;
const TEST_BUFFER_POOL_PAGE_SIZE: usize = 1024;
const TEST_MMR_ITEMS_PER_BLOB: u64 = 1024;
const TEST_MMR_WRITE_BUFFER: usize = 1024;
const TEST_LOG_ITEMS_PER_SECTION: u64 = 1024;
const TEST_LOG_WRITE_BUFFER: usize = 1024;
const TEST_LOCATIONS_ITEMS_PER_BLOB: u64 = 1024;

/// Creates a deterministic 32-byte game seed
pub fn create_game_seed(n: u64) -> [u8; 32] {
    let mut seed = [0u8; 32];
    StdRng::seed_from_u64(n).fill_bytes(&mut seed);
    seed
}

/// Creates a ledger over a fresh in-memory store with default limits
pub fn create_memory_ledger() -> Ledger<Memory> {
    Ledger::new(Memory::default(), Limits::default())
}

/// Creates a state database for testing
pub async fn create_state_db_result<E: Spawner + Metrics + Storage + Clock>(
    context: &E,
) -> anyhow::Result<Adb<E, EightCap>> {
    let buffer_pool = PoolRef::new(
        NZUsize!(TEST_BUFFER_POOL_PAGES),
        NZUsize!(TEST_BUFFER_POOL_PAGE_SIZE),
    );

    let state = Adb::init(
        context.with_label("state"),
        adb::any::variable::Config {
            mmr_journal_partition: String::from("state-mmr-journal"),
            mmr_metadata_partition: String::from("state-mmr-metadata"),
            mmr_items_per_blob: NZU64!(TEST_MMR_ITEMS_PER_BLOB),
            mmr_write_buffer: NZUsize!(TEST_MMR_WRITE_BUFFER),
            log_journal_partition: String::from("state-log-journal"),
            log_items_per_section: NZU64!(TEST_LOG_ITEMS_PER_SECTION),
            log_write_buffer: NZUsize!(TEST_LOG_WRITE_BUFFER),
            log_compression: None,
            log_codec_config: (),
            locations_journal_partition: String::from("state-locations-journal"),
            locations_items_per_blob: NZU64!(TEST_LOCATIONS_ITEMS_PER_BLOB),
            translator: EightCap,
            thread_pool: None,
            buffer_pool,
        },
    )
    .await
    .context("failed to initialize state ADB")?;

    Ok(state)
}

pub async fn create_state_db<E: Spawner + Metrics + Storage + Clock>(
    context: &E,
) -> Adb<E, EightCap> {
    create_state_db_result(context)
        .await
        .expect("failed to initialize test database")
}
