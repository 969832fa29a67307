pub mod category_dto;

pub use category_dto::{
    CategoryDetailDto, CategoryListingDto, CategoryOrderDto, CategoryQueryParams,
    CategoryResponseDto, CategoryTreeDto, CreateCategoryDto, ReorderCategoriesDto,
    UpdateCategoryDto,
};
