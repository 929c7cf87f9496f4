mod common;

use recipes_sdk::{
    actions::{
        attach_amount, create_amount, create_recipe, delete_amount, delete_ingredient,
        detach_amount, get_amount, list_recipe_ingredients,
    },
    config::SchemaConfig,
    schema::NewAmount,
    Error,
};

use common::{create_user, ingredient, recipe, recipe_data, setup};

// The (recipe, ingredient) pair was meant to be unique, but the schema has
// never enforced it. These tests pin down the current behavior; they do
// not claim it is the desired one.
#[tokio::test]
async fn duplicate_recipe_ingredient_pair_is_currently_accepted() {
    let config = SchemaConfig::default();
    let Some(pool) = setup(&config).await else {
        return;
    };

    let author = create_user("chef", &config, &pool).await;
    let soup = recipe(author, "Soup", &config, &pool).await;
    let salt = ingredient("Salt", "g", &pool).await;

    let first = create_amount(&NewAmount::new(salt, 5).unwrap(), &pool)
        .await
        .unwrap();
    let second = create_amount(&NewAmount::new(salt, 10).unwrap(), &pool)
        .await
        .unwrap();

    attach_amount(first, soup, &config, &pool).await.unwrap();
    attach_amount(second, soup, &config, &pool).await.unwrap();

    let ingredients = list_recipe_ingredients(soup, &pool).await.unwrap();
    assert_eq!(ingredients.len(), 2);
    assert!(ingredients.iter().all(|i| i.ingredient_id == salt));
}

#[tokio::test]
async fn duplicate_ingredient_in_one_recipe_write_is_currently_accepted() {
    let config = SchemaConfig::default();
    let Some(pool) = setup(&config).await else {
        return;
    };

    let author = create_user("chef", &config, &pool).await;
    let salt = ingredient("Salt", "g", &pool).await;

    let soup = create_recipe(
        author,
        &recipe_data("Soup", &[], &[(salt, 5), (salt, 5)]),
        &config,
        &pool,
    )
    .await
    .unwrap();

    assert_eq!(list_recipe_ingredients(soup, &pool).await.unwrap().len(), 2);
}

#[tokio::test]
async fn enforced_pair_guard_rejects_duplicates() {
    let config = SchemaConfig {
        enforce_amount_pair_uniqueness: true,
        ..SchemaConfig::default()
    };
    let Some(pool) = setup(&config).await else {
        return;
    };

    let author = create_user("chef", &config, &pool).await;
    let soup = recipe(author, "Soup", &config, &pool).await;
    let salt = ingredient("Salt", "g", &pool).await;
    let pepper = ingredient("Pepper", "g", &pool).await;

    let first = create_amount(&NewAmount::new(salt, 5).unwrap(), &pool)
        .await
        .unwrap();
    let second = create_amount(&NewAmount::new(salt, 10).unwrap(), &pool)
        .await
        .unwrap();
    let third = create_amount(&NewAmount::new(pepper, 1).unwrap(), &pool)
        .await
        .unwrap();

    attach_amount(first, soup, &config, &pool).await.unwrap();
    attach_amount(third, soup, &config, &pool).await.unwrap();
    // Re-linking the same amount is not a second pair.
    attach_amount(first, soup, &config, &pool).await.unwrap();

    let err = attach_amount(second, soup, &config, &pool)
        .await
        .unwrap_err();
    match err {
        Error::UniqueViolation { constraint } => {
            assert_eq!(constraint, "recipe_ingredient_constraint")
        }
        other => panic!("unexpected {other:?}"),
    }

    let err = create_recipe(
        author,
        &recipe_data("Stew", &[], &[(salt, 5), (salt, 5)]),
        &config,
        &pool,
    )
    .await
    .unwrap_err();
    assert!(err.is_unique_violation());

    assert_eq!(list_recipe_ingredients(soup, &pool).await.unwrap().len(), 2);
}

#[tokio::test]
async fn enforced_pair_guard_holds_under_concurrent_attaches() {
    let config = SchemaConfig {
        enforce_amount_pair_uniqueness: true,
        ..SchemaConfig::default()
    };
    let Some(pool) = setup(&config).await else {
        return;
    };

    let author = create_user("chef", &config, &pool).await;
    let salt = ingredient("Salt", "g", &pool).await;

    for round in 0..10 {
        let soup = recipe(author, &format!("Soup{round}"), &config, &pool).await;
        let first = create_amount(&NewAmount::new(salt, 5).unwrap(), &pool)
            .await
            .unwrap();
        let second = create_amount(&NewAmount::new(salt, 10).unwrap(), &pool)
            .await
            .unwrap();

        let tasks = [first, second].map(|amount| {
            let (config, pool) = (config.clone(), pool.clone());
            tokio::spawn(async move { attach_amount(amount, soup, &config, &pool).await })
        });

        let mut rejected = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(()) => {}
                Err(e) if e.is_unique_violation() => rejected += 1,
                Err(e) => panic!("unexpected {e:?}"),
            }
        }

        assert_eq!(rejected, 1, "round {round}");
        assert_eq!(list_recipe_ingredients(soup, &pool).await.unwrap().len(), 1);
    }
}

#[tokio::test]
async fn one_amount_can_belong_to_several_recipes() {
    let config = SchemaConfig::default();
    let Some(pool) = setup(&config).await else {
        return;
    };

    let author = create_user("chef", &config, &pool).await;
    let soup = recipe(author, "Soup", &config, &pool).await;
    let stew = recipe(author, "Stew", &config, &pool).await;
    let water = ingredient("Water", "ml", &pool).await;

    let amount = create_amount(&NewAmount::new(water, 1000).unwrap(), &pool)
        .await
        .unwrap();
    attach_amount(amount, soup, &config, &pool).await.unwrap();
    attach_amount(amount, stew, &config, &pool).await.unwrap();

    assert!(detach_amount(amount, soup, &pool).await.unwrap());
    assert!(list_recipe_ingredients(soup, &pool).await.unwrap().is_empty());
    assert_eq!(list_recipe_ingredients(stew, &pool).await.unwrap().len(), 1);
}

#[tokio::test]
async fn deleting_ingredient_cascades_to_amounts() {
    let config = SchemaConfig::default();
    let Some(pool) = setup(&config).await else {
        return;
    };

    let author = create_user("chef", &config, &pool).await;
    let salt = ingredient("Salt", "g", &pool).await;
    let soup = create_recipe(
        author,
        &recipe_data("Soup", &[], &[(salt, 5)]),
        &config,
        &pool,
    )
    .await
    .unwrap();
    let amount_id = list_recipe_ingredients(soup, &pool).await.unwrap()[0].amount_id;

    assert!(delete_ingredient(salt, &pool).await.unwrap());
    assert!(get_amount(amount_id, &pool).await.unwrap().is_none());
    assert!(list_recipe_ingredients(soup, &pool).await.unwrap().is_empty());
}

#[tokio::test]
async fn database_rejects_negative_amounts() {
    let config = SchemaConfig::default();
    let Some(pool) = setup(&config).await else {
        return;
    };

    let salt = ingredient("Salt", "g", &pool).await;
    let err = sqlx::query("INSERT INTO amounts (amount, ingredient_id) VALUES (-1, $1)")
        .bind(salt)
        .execute(&pool)
        .await
        .map_err(Error::from)
        .unwrap_err();
    assert!(matches!(err, Error::CheckViolation { .. }));

    let amount = create_amount(&NewAmount::new(salt, 1).unwrap(), &pool)
        .await
        .unwrap();
    assert!(delete_amount(amount, &pool).await.unwrap());
}
