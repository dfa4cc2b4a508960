pub mod stats_dto;

pub use stats_dto::{
    ConnectionDto, ConnectionStateCountDto, ConnectionsResponseDto, DatabaseStatsResponseDto,
    DatabaseSummaryDto, RowCountDto, SlowQueriesResponseDto, SlowQueryDto, TableSizeDto,
};
