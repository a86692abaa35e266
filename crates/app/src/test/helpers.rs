//! Test Helpers

use crate::{
    domain::{
        addresses::{
            AddressesService, AddressesServiceError,
            data::NewAddress,
            records::{AddressRecord, AddressUuid},
        },
        carts::{CartsService, CartsServiceError, data::NewCartItem, records::CartItemRecord},
        orders::{
            OrdersService, PgOrdersService,
            data::{NewOrder, NewOrderItem},
            records::OrderRecord,
        },
        products::{
            ProductsService, ProductsServiceError,
            data::{NewProduct, NewSku},
            records::{ProductRecord, ProductUuid, SkuRecord, SkuUuid},
        },
        users::UserUuid,
    },
    test::TestContext,
};

pub(crate) async fn create_product(ctx: &TestContext) -> Result<ProductRecord, ProductsServiceError> {
    ctx.products
        .create_product(NewProduct {
            uuid: ProductUuid::new(),
            title: "Test Product".to_string(),
            description: "A product for tests".to_string(),
            on_sale: true,
        })
        .await
}

/// A SKU under a fresh product.
pub(crate) async fn create_sku(
    ctx: &TestContext,
    price: u64,
    stock: u64,
) -> Result<SkuRecord, ProductsServiceError> {
    let product = create_product(ctx).await?;

    ctx.products
        .create_sku(NewSku {
            uuid: SkuUuid::new(),
            product_uuid: product.uuid,
            title: "Default".to_string(),
            description: "Default variant".to_string(),
            price,
            stock,
        })
        .await
}

pub(crate) async fn create_address(
    ctx: &TestContext,
    user: UserUuid,
) -> Result<AddressRecord, AddressesServiceError> {
    ctx.addresses
        .create_address(
            user,
            NewAddress {
                uuid: AddressUuid::new(),
                province: "Guangdong".to_string(),
                city: "Shenzhen".to_string(),
                district: "Nanshan".to_string(),
                address: "1 Keyuan Rd".to_string(),
                zip: "518000".to_string(),
                contact_name: "Li Lei".to_string(),
                contact_phone: "13800000000".to_string(),
            },
        )
        .await
}

pub(crate) async fn add_to_cart(
    ctx: &TestContext,
    user: UserUuid,
    sku: SkuUuid,
    amount: u32,
) -> Result<CartItemRecord, CartsServiceError> {
    ctx.carts
        .add_to_cart(
            user,
            NewCartItem {
                sku_uuid: sku,
                amount,
            },
        )
        .await
}

/// Place an order for `user` at a fresh address through the context's
/// orders service.
pub(crate) async fn place_order(
    ctx: &TestContext,
    user: UserUuid,
    items: &[(SkuUuid, u32)],
) -> Result<OrderRecord, Box<dyn std::error::Error + Send + Sync>> {
    place_order_with(&ctx.orders, ctx, user, items).await
}

pub(crate) async fn place_order_with(
    orders: &PgOrdersService,
    ctx: &TestContext,
    user: UserUuid,
    items: &[(SkuUuid, u32)],
) -> Result<OrderRecord, Box<dyn std::error::Error + Send + Sync>> {
    let address = create_address(ctx, user).await?;

    let order = orders
        .place_order(
            user,
            NewOrder {
                address_uuid: address.uuid,
                remark: None,
                items: items
                    .iter()
                    .map(|&(sku_uuid, amount)| NewOrderItem { sku_uuid, amount })
                    .collect(),
            },
        )
        .await?;

    Ok(order)
}
