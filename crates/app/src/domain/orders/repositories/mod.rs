pub(crate) mod items;
pub(crate) mod orders;

pub(crate) use items::PgOrderItemsRepository;
pub(crate) use orders::PgOrdersRepository;
