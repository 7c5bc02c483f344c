use sea_query::Iden;

#[derive(Iden, Clone)]
pub enum Category {
    Table,
    Id,
    Name,
    CreatedAt,
}

#[derive(Iden, Clone)]
pub enum Course {
    Table,
    Id,
    UserId,
    Title,
    Description,
    ImageUrl,
    Price,
    CategoryId,
    IsPublished,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden, Clone)]
pub enum PensumTopic {
    Table,
    Id,
    CourseId,
    Title,
    Position,
    IsPublished,
    CreatedAt,
}

#[derive(Iden, Clone)]
pub enum Chapter {
    Table,
    Id,
    CourseId,
    TopicId,
    Title,
    Description,
    VideoUrl,
    PdfUrl,
    GoogleFormUrl,
    Position,
    IsFree,
    IsPublished,
    UnlockAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden, Clone)]
pub enum UserProgress {
    Table,
    UserId,
    ChapterId,
    IsCompleted,
    UpdatedAt,
}

#[derive(Iden, Clone)]
pub enum Purchase {
    Table,
    UserId,
    CourseId,
    CreatedAt,
}
