pub mod file_dto;

pub use file_dto::{
    CreateFileDto, FileDetailDto, FileListItemDto, FileQueryParams, FileSortBy,
    FileWithRelationsDto, UpdateFileDto, ViewFileDto, ViewFileResponseDto,
};
