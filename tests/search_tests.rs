use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use std::io::Write;
use tempfile::NamedTempFile;

use recipe_search::recipe::Corpus;
use recipe_search::search::{
    build_vector_space, load_corpus, load_corpus_from_reader, load_corpus_with, search,
    LoaderOptions, QueryFilters, ScoredResult, VectorSpace,
};

const HEADER: &str = "name,minutes,tags,steps,ingredients,nutrition,description";

fn corpus_from_rows(rows: &[&str]) -> Result<Corpus> {
    let mut csv = format!("{}\n", HEADER);
    for row in rows {
        csv.push_str(row);
        csv.push('\n');
    }
    Ok(load_corpus_from_reader(csv.as_bytes(), &LoaderOptions::default())?)
}

fn soup_and_stew() -> Result<(Corpus, VectorSpace)> {
    let corpus = corpus_from_rows(&[
        concat!(
            r#"Veg Soup,20,"['vegetarian']","['chop', 'boil']","['carrot','onion','water']","#,
            r#""[120.0, 1, 2, 3, 5.0, 4, 6]",light"#
        ),
        concat!(
            r#"Beef Stew,90,"['meat']","['brown', 'simmer']","['beef','onion','water']","#,
            r#""[450.0, 1, 2, 3, 35.0, 4, 6]","#
        ),
    ])?;
    let vs = build_vector_space(&corpus)?;
    Ok((corpus, vs))
}

fn names(results: &[ScoredResult<'_>]) -> Vec<String> {
    results.iter().map(|r| r.record.name.clone()).collect()
}

#[test]
fn test_vegetarian_scenario() -> Result<()> {
    let (corpus, vs) = soup_and_stew()?;
    let filters = QueryFilters {
        vegetarian_only: true,
        max_cook_time: 60,
        ..QueryFilters::default()
    };
    assert_eq!(names(&search("onion", &vs, &corpus, &filters)), vec!["Veg Soup"]);
    Ok(())
}

#[test]
fn test_cook_time_scenario() -> Result<()> {
    let (corpus, vs) = soup_and_stew()?;
    let filters = QueryFilters {
        max_cook_time: 30,
        ..QueryFilters::default()
    };
    assert_eq!(names(&search("onion", &vs, &corpus, &filters)), vec!["Veg Soup"]);

    let relaxed = QueryFilters {
        max_cook_time: 90,
        ..QueryFilters::default()
    };
    assert_eq!(search("onion", &vs, &corpus, &relaxed).len(), 2);
    Ok(())
}

#[test]
fn test_non_alphabetic_query_returns_nothing() -> Result<()> {
    let (corpus, vs) = soup_and_stew()?;
    assert!(search("123!!", &vs, &corpus, &QueryFilters::default()).is_empty());
    assert!(search("", &vs, &corpus, &QueryFilters::default()).is_empty());
    assert!(search("   ", &vs, &corpus, &QueryFilters::default().with_term_boost()).is_empty());
    Ok(())
}

#[test]
fn test_malformed_nutrition_is_excluded_not_fatal() -> Result<()> {
    let corpus = corpus_from_rows(&[
        r#"Good,10,x,"['a']","['onion']","[200.0, 1, 2, 3, 10.0, 4, 6]","#,
        r#"Broken,10,x,"['a']","['onion']","[200.0, oops]","#,
        r#"Short,10,x,"['a']","['onion']","[200.0, 1, 2]","#,
    ])?;
    let vs = build_vector_space(&corpus)?;
    let filters = QueryFilters {
        max_calories: Some(500),
        ..QueryFilters::default()
    };
    assert_eq!(names(&search("onion", &vs, &corpus, &filters)), vec!["Good"]);

    // Without nutrition bounds the same records are eligible.
    assert_eq!(search("onion", &vs, &corpus, &QueryFilters::default()).len(), 3);
    Ok(())
}

#[test]
fn test_empty_ingredients_never_score() -> Result<()> {
    let corpus = corpus_from_rows(&[
        r#"Plain,10,x,"['a']","['onion', 'garlic']",,"#,
        r#"Nothing,10,x,"['a']","['1/2', '---']",,"#,
        r#"Garbled,10,x,"['a']","['onion'",,"#,
    ])?;
    let vs = build_vector_space(&corpus)?;
    for query in ["onion", "garlic onion", "truffle"] {
        for result in search(query, &vs, &corpus, &QueryFilters::default()) {
            if result.record.ingredients_normalized.is_empty() {
                assert_eq!(result.similarity, 0.0, "{} for {:?}", result.record.name, query);
            }
        }
    }
    Ok(())
}

#[test]
fn test_refit_is_deterministic() -> Result<()> {
    let (corpus, first) = soup_and_stew()?;
    let second = build_vector_space(&corpus)?;
    let filters = QueryFilters::default().with_term_boost();
    for query in ["onion", "beef water", "carrot onion leek"] {
        let a: Vec<(String, f64)> = search(query, &first, &corpus, &filters)
            .iter()
            .map(|r| (r.record.name.clone(), r.final_score))
            .collect();
        let b: Vec<(String, f64)> = search(query, &second, &corpus, &filters)
            .iter()
            .map(|r| (r.record.name.clone(), r.final_score))
            .collect();
        assert_eq!(a, b);
    }
    Ok(())
}

#[test]
fn test_ties_keep_corpus_order() -> Result<()> {
    let corpus = corpus_from_rows(&[
        r#"Third,10,x,"['a']","['leek']",,"#,
        r#"A,10,x,"['a']","['onion', 'salt']",,"#,
        r#"B,10,x,"['a']","['onion', 'salt']",,"#,
        r#"C,10,x,"['a']","['onion', 'salt']",,"#,
    ])?;
    let vs = build_vector_space(&corpus)?;
    let results = search("onion", &vs, &corpus, &QueryFilters::default());
    assert_eq!(names(&results), vec!["A", "B", "C", "Third"]);

    let boosted = search("onion", &vs, &corpus, &QueryFilters::default().with_term_boost());
    assert_eq!(names(&boosted), vec!["A", "B", "C", "Third"]);
    Ok(())
}

#[test]
fn test_top_n_bounds() -> Result<()> {
    let (corpus, vs) = soup_and_stew()?;
    let none = QueryFilters {
        top_n: 0,
        ..QueryFilters::default()
    };
    assert!(search("onion", &vs, &corpus, &none).is_empty());

    let one = QueryFilters {
        top_n: 1,
        ..QueryFilters::default()
    };
    assert_eq!(search("onion", &vs, &corpus, &one).len(), 1);

    let many = QueryFilters {
        top_n: 50,
        ..QueryFilters::default()
    };
    let results = search("onion", &vs, &corpus, &many);
    assert_eq!(results.len(), 2);
    let unique: HashSet<String> = names(&results).into_iter().collect();
    assert_eq!(unique.len(), 2);
    Ok(())
}

#[test]
fn test_cook_time_filter_is_monotonic() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(7);
    let pantry = ["onion", "carrot", "beef", "leek", "garlic", "rice", "tomato", "basil"];
    let rows: Vec<String> = (0..40)
        .map(|i| {
            let picks: Vec<String> = (0..3)
                .map(|_| format!("'{}'", pantry[rng.gen_range(0..pantry.len())]))
                .collect();
            format!(
                r#"Recipe {},{},"['easy']","['cook']","[{}]",,"#,
                i,
                rng.gen_range(0..180),
                picks.join(", ")
            )
        })
        .collect();
    let row_refs: Vec<&str> = rows.iter().map(String::as_str).collect();
    let corpus = corpus_from_rows(&row_refs)?;
    let vs = build_vector_space(&corpus)?;

    for _ in 0..25 {
        let low = rng.gen_range(0..180u32);
        let high = rng.gen_range(low..=200u32);
        let query = pantry[rng.gen_range(0..pantry.len())];
        let eligible = |cap: u32| -> HashSet<String> {
            let filters = QueryFilters {
                max_cook_time: cap,
                top_n: corpus.len(),
                ..QueryFilters::default()
            };
            names(&search(query, &vs, &corpus, &filters)).into_iter().collect()
        };
        let smaller = eligible(low);
        let larger = eligible(high);
        assert!(smaller.is_subset(&larger), "cap {} vs {} for {:?}", low, high, query);
    }
    Ok(())
}

#[test]
fn test_filter_rich_load_from_path() -> Result<()> {
    let mut file = NamedTempFile::new()?;
    writeln!(file, "{}", HEADER)?;
    writeln!(
        file,
        r#"Veg Soup,20,"['vegetarian']","['boil']","['onion']","[120.0, 1, 2, 3, 5.0, 4, 6]","#
    )?;
    writeln!(file, r#"Mystery,20,"['vegetarian']","['boil']","['onion']",,"#)?;
    file.flush()?;

    assert_eq!(load_corpus(file.path())?.len(), 2);
    let corpus = load_corpus_with(file.path(), &LoaderOptions::filter_rich())?;
    assert_eq!(corpus.len(), 1);
    assert_eq!(corpus.get(0).map(|r| r.description.as_str()), Some(""));
    Ok(())
}
