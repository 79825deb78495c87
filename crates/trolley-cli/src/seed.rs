//! Demo data for a local database: a plausible slice of a UK grocery
//! crawl, plus two shoppers with lists.

use rust_decimal_macros::dec;
use trolley::{ListStore, PriceChange, SignalRecorder, signal_channel};
use trolley::{catalog, list, price, signal};

pub async fn seed() -> Result<(), Box<dyn std::error::Error>> {
    let url = super::database_url();
    println!("🌱 Seeding database: {}", url);
    let provider = trolley::connect(&url).await?;

    println!("🗑️  Clearing existing data...");
    provider.execute("DELETE FROM crawl_priority", &[]).await.ok();
    provider.execute("DELETE FROM store_promotion", &[]).await.ok();
    provider.execute("DELETE FROM shopping_list_item", &[]).await.ok();
    provider.execute("DELETE FROM shopping_list", &[]).await.ok();
    provider.execute("DELETE FROM shopper", &[]).await.ok();
    provider.execute("DELETE FROM price_history", &[]).await.ok();
    provider.execute("DELETE FROM store_price", &[]).await.ok();
    provider.execute("DELETE FROM product", &[]).await.ok();

    println!("🛒 Creating products...");
    let products = [
        ("Soft White Medium Bread 800g", "Hovis", "bakery", dec!(1.05)),
        ("Toastie Thick Sliced White 800g", "Warburtons", "bakery", dec!(1.35)),
        ("Original Taste 330ml Can", "Coca Cola", "drinks", dec!(0.80)),
        ("Max No Sugar 330ml Can", "Pepsi", "drinks", dec!(0.75)),
        ("Cravendale Whole Milk 2L", "Arla", "dairy", dec!(1.20)),
        ("Large Free Range Eggs x6", "Happy Egg", "dairy", dec!(1.60)),
        ("British Chicken Breast Fillets 600g", "Birchwood", "meat", dec!(3.85)),
        ("Penne Rigate 500g", "Napolina", "pantry", dec!(0.95)),
        ("Mature Cheddar 350g", "Cathedral City", "dairy", dec!(3.20)),
        ("Fairtrade Bananas x5", "Fyffes", "produce", dec!(0.85)),
    ];
    let mut ids = Vec::with_capacity(products.len());
    for (name, brand, category, reference) in products {
        let id = catalog::upsert_product(&provider, name, brand, category, Some(reference)).await?;
        println!("  {} {}", brand, name);
        ids.push(id);
    }

    println!("🏷️  Creating store prices...");
    let prices = [
        (0, "Tesco", dec!(1.10), None),
        (0, "ASDA", dec!(1.05), None),
        (0, "Morrisons", dec!(1.15), None),
        (1, "Tesco", dec!(1.40), Some("Clubcard price")),
        (1, "ASDA", dec!(1.35), None),
        (1, "Morrisons", dec!(1.38), None),
        (2, "Tesco", dec!(0.85), None),
        (2, "ASDA", dec!(0.82), None),
        (2, "Morrisons", dec!(0.88), None),
        (3, "ASDA", dec!(0.80), Some("2 for £1.50")),
        (3, "Morrisons", dec!(0.79), None),
        (4, "Tesco", dec!(1.25), None),
        (4, "ASDA", dec!(1.25), None),
        (4, "Morrisons", dec!(1.20), None),
        (5, "Tesco", dec!(1.70), None),
        (5, "Morrisons", dec!(1.65), None),
        (6, "Tesco", dec!(3.99), Some("Aldi price match")),
        (6, "ASDA", dec!(3.89), None),
        (6, "Morrisons", dec!(4.10), None),
        (7, "Tesco", dec!(1.05), None),
        (7, "ASDA", dec!(0.99), None),
        (7, "Morrisons", dec!(1.02), None),
        (8, "Tesco", dec!(3.25), Some("Clubcard price")),
        (8, "ASDA", dec!(3.40), None),
        (8, "Morrisons", dec!(3.30), None),
        (9, "Tesco", dec!(0.90), None),
        (9, "ASDA", dec!(0.90), None),
        (9, "Morrisons", dec!(0.95), None),
    ];
    for (idx, store, value, offer) in prices {
        let update = price::PriceUpdate {
            product_id: ids[idx].clone(),
            store_name: store.to_string(),
            price: value,
            offer_text: offer.map(str::to_string),
            availability: true,
        };
        price::apply_price_update(&provider, &update).await?;
    }
    println!("  {} price rows across 3 stores", prices.len());

    println!("📉 Recording price movements...");
    let changes = [
        (0, "Tesco", dec!(1.00)),
        (6, "ASDA", dec!(4.05)),
        (7, "Morrisons", dec!(0.95)),
    ];
    for (idx, store, value) in changes {
        let update = price::PriceUpdate {
            product_id: ids[idx].clone(),
            store_name: store.to_string(),
            price: value,
            offer_text: None,
            availability: true,
        };
        match price::apply_price_update(&provider, &update).await? {
            PriceChange::Changed { old, new } => {
                println!("  {} at {}: £{} -> £{}", products[idx].0, store, old, new);
            }
            _ => println!("  {} at {}: £{}", products[idx].0, store, value),
        }
    }

    println!("👥 Creating shoppers and lists...");
    let (sender, rx) = signal_channel(64);
    let recorder = tokio::spawn(SignalRecorder::new(provider.clone(), rx).run());
    let lists = ListStore::new(provider.clone()).with_signals(sender);

    let alice = list::create_shopper(&provider, "alice@example.com", "Alice").await?;
    let weekly = lists.create_list(alice, "Weekly Shop", false).await?;
    let tesco_only = vec!["Tesco".to_string()];
    lists.add_item(weekly, "hovis bread", 1, &tesco_only).await?;
    lists.add_item(weekly, "cravendale milk", 2, &[]).await?;
    lists.add_item(weekly, "free range eggs", 1, &[]).await?;
    lists.add_item(weekly, "chicken breast", 1, &[]).await?;
    lists.add_item(weekly, "bananas", 6, &[]).await?;
    println!("  Alice's \"Weekly Shop\": 5 items");

    let bob = list::create_shopper(&provider, "bob@example.com", "Bob").await?;
    let bbq = lists.create_list(bob, "BBQ Saturday", true).await?;
    lists.add_item(bbq, "chicken breast", 2, &[]).await?;
    lists.add_item(bbq, "coca cola", 12, &[]).await?;
    lists.add_item(bbq, "burger buns", 8, &[]).await?;
    println!("  Bob's \"BBQ Saturday\": 3 items");

    // Every sender must be gone before the recorder drains and stops.
    drop(lists);
    recorder.await?;

    println!("📡 Recording search signals...");
    let searches = [
        ("oat milk", None),
        ("sourdough", Some("Waitrose")),
        ("pepsi max", Some("Tesco")),
        ("pepsi max", Some("Tesco")),
    ];
    for (query, store) in searches {
        signal::record_search(&provider, query, store).await?;
    }
    println!("  {} searches recorded", searches.len());

    println!("📣 Creating promotions...");
    provider
        .execute(
            r#"
INSERT INTO store_promotion (store_name, promotion_type, title, description, display_priority)
VALUES
    ('Tesco', 'banner', 'Clubcard Prices week', 'Extra savings on 200+ lines', 10),
    ('ASDA', 'banner', 'Rollback Rewards', 'Prices rolled back across the store', 5),
    ('Morrisons', 'voucher', 'More Card: £5 off £40', NULL, 0)
"#,
            &[],
        )
        .await?;
    println!("  3 promotions");

    println!();
    println!("═══════════════════════════════════════");
    println!("  Seed complete");
    println!("  products:    {}", products.len());
    println!("  prices:      {}", prices.len());
    println!("  shoppers:    2");
    println!("  lists:       2 (8 items)");
    println!("  promotions:  3");
    println!("═══════════════════════════════════════");

    Ok(())
}
