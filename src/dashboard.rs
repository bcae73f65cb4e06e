use crate::chart::{SectorData, SectorInfo, Sector};
use crate::providers::{ChartProvider, provide_or_empty};
use crate::store::{ChartStore, StorageBackend};

/// One sector's row: built-in charts first, then the user's charts
pub async fn sector_row<P, B>(provider: &P, store: &ChartStore<B>, sector: Sector) -> SectorData
where
    P: ChartProvider + ?Sized,
    B: StorageBackend,
{
    let mut charts = provide_or_empty(provider, sector).await;
    charts.extend(store.list_by_sector(sector));
    SectorData {
        info: SectorInfo::from(sector),
        charts,
    }
}

/// Every sector's row, in dashboard order
pub async fn dashboard<P, B>(provider: &P, store: &ChartStore<B>) -> Vec<SectorData>
where
    P: ChartProvider + ?Sized,
    B: StorageBackend,
{
    let mut rows = Vec::with_capacity(Sector::ALL.len());
    for sector in Sector::ALL {
        rows.push(sector_row(provider, store, sector).await);
    }
    rows
}
