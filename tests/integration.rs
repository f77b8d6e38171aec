//! End-to-end tests over a small on-disk catalogue.
//!
//! The fixture repository has five concept sets, one relation chain and two
//! catalogued concept lists, enough to exercise mapping, lookup, relation
//! walks, list comparison and the structural check together.

use std::path::{Path, PathBuf};

use concepticon::catalog::{CatalogError, Concepticon, write_conceptlist};
use concepticon::config::CatalogConfig;
use concepticon::graph::RelationKind;
use concepticon::mapping::{MapMode, MappingConfig};
use concepticon::model::ConceptList;

fn write(path: PathBuf, content: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn repository(root: &Path) {
    let data = root.join("concepticondata");
    write(
        data.join("concepticon.tsv"),
        "ID\tGLOSS\tSEMANTICFIELD\tDEFINITION\tONTOLOGICAL_CATEGORY\n\
         1\tANIMAL\tAnimals\tA living creature.\tPerson/Thing\n\
         2\tDOG\tAnimals\tA domesticated canine.\tPerson/Thing\n\
         3\tWATER\tThe physical world\tA clear liquid.\tPerson/Thing\n\
         4\tMOUNTAIN\tThe physical world\tA large natural elevation.\tPerson/Thing\n\
         5\tHILL\tThe physical world\tA small natural elevation.\tPerson/Thing\n",
    );
    write(
        data.join("conceptrelations.tsv"),
        "SOURCE\tSOURCE_GLOSS\tRELATION\tTARGET\tTARGET_GLOSS\n\
         1\tANIMAL\tnarrower\t2\tDOG\n\
         4\tMOUNTAIN\tnarrower\t5\tHILL\n",
    );
    write(
        data.join("conceptlists.tsv"),
        "ID\tAUTHOR\tYEAR\tITEMS\tTAGS\tSOURCE_LANGUAGE\n\
         A-2020-2\tAlpha, Ann\t2020\t2\tbasic\tEnglish\n\
         B-2021-2\tBeta, Bob and Gamma, Gil\t2021\t2\tbasic\tEnglish\n",
    );
    write(
        data.join("conceptlists").join("A-2020-2.tsv"),
        "ID\tNUMBER\tENGLISH\tCONCEPTICON_ID\tCONCEPTICON_GLOSS\n\
         A-2020-2-1\t1\tdog\t2\tDOG\n\
         A-2020-2-2\t2\twater\t3\tWATER\n",
    );
    write(
        data.join("conceptlists").join("B-2021-2.tsv"),
        "ID\tNUMBER\tENGLISH\tCONCEPTICON_ID\tCONCEPTICON_GLOSS\n\
         B-2021-2-1\t1\tanimal\t1\tANIMAL\n\
         B-2021-2-2\t2\twater\t3\tWATER\n",
    );
    write(
        root.join("mappings").join("map-en.tsv"),
        "ID\tGLOSS\n\
         1\tANIMAL///animal\n\
         2\tDOG///dog\n\
         3\tWATER///water\n\
         4\tMOUNTAIN///mountain\n\
         5\tHILL///hill\n",
    );
}

fn open(dir: &tempfile::TempDir) -> Concepticon {
    repository(dir.path());
    Concepticon::open(&CatalogConfig::with_repos(dir.path())).unwrap()
}

#[test]
fn open_loads_every_table() {
    let dir = tempfile::TempDir::new().unwrap();
    let catalog = open(&dir);
    assert_eq!(catalog.conceptsets().len(), 5);
    assert_eq!(catalog.relations().raw().len(), 2);
    assert_eq!(catalog.multirelations().raw().len(), 2);
    assert_eq!(catalog.conceptlists().len(), 2);
    assert_eq!(catalog.conceptlists()["A-2020-2"].year, 2020);
}

#[test]
fn map_concepts_report() {
    let dir = tempfile::TempDir::new().unwrap();
    let catalog = open(&dir);
    let clist = dir.path().join("mine.tsv");
    write(
        clist.clone(),
        "ID\tNUMBER\tENGLISH\n\
         x-1\t1\tthe dog\n\
         x-2\t2\twater\n\
         x-3\t3\tglorp\n",
    );

    let mut out = Vec::new();
    let summary = catalog
        .map(&clist, None, &MappingConfig::default(), false, &mut out)
        .unwrap();
    assert_eq!((summary.good, summary.total), (2, 3));

    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines[0],
        "ID\tNUMBER\tENGLISH\tCONCEPTICON_ID\tCONCEPTICON_GLOSS\tSIMILARITY"
    );
    assert!(lines[1].starts_with("x-1\t1\tthe dog\t2\tDOG\t"));
    assert_eq!(lines[2], "x-2\t2\twater\t3\tWATER\t1");
    assert_eq!(lines[3], "x-3\t3\tglorp\t\t???\t");
    assert_eq!(lines[4], "#\t2/3\t67%\t\t\t");
}

#[test]
fn map_against_another_list() {
    let dir = tempfile::TempDir::new().unwrap();
    let catalog = open(&dir);
    let other = dir.path().join("concepticondata/conceptlists/B-2021-2.tsv");
    let clist = dir.path().join("concepticondata/conceptlists/A-2020-2.tsv");

    let mut out = Vec::new();
    let mapping = MappingConfig {
        mode: MapMode::Exhaustive,
        ..Default::default()
    };
    let summary = catalog.map(&clist, Some(&other), &mapping, false, &mut out).unwrap();
    assert_eq!(summary.good, 1);
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("A-2020-2-2\t2\twater\t3\tWATER\tB-2021-2-2\twater\t1"));
}

#[test]
fn unknown_language_is_reported() {
    let dir = tempfile::TempDir::new().unwrap();
    let catalog = open(&dir);
    let mapping = MappingConfig {
        language: "xx".into(),
        ..Default::default()
    };
    let err = catalog.lookup(&["dog"], &mapping).unwrap_err();
    assert!(matches!(err, CatalogError::UnknownLanguage { .. }));
}

#[test]
fn lookup_finds_concept_sets() {
    let dir = tempfile::TempDir::new().unwrap();
    let catalog = open(&dir);
    let hits = catalog
        .lookup(&["the dog", "mountain", "sky"], &MappingConfig::default())
        .unwrap();
    let ids: Vec<Vec<&str>> = hits
        .iter()
        .map(|h| h.iter().map(|hit| hit.id.as_str()).collect())
        .collect();
    assert_eq!(ids, vec![vec!["2"], vec!["4"], vec![]]);
}

#[test]
fn related_walks_ids_and_glosses() {
    let dir = tempfile::TempDir::new().unwrap();
    let catalog = open(&dir);
    let by_id: Vec<_> = catalog.related("4", RelationKind::Narrower, 2).collect();
    assert_eq!(by_id, vec![("5", 1)]);
    let by_gloss: Vec<_> = catalog.related("HILL", RelationKind::Broader, 2).collect();
    assert_eq!(by_gloss, vec![("MOUNTAIN", 1)]);
    assert_eq!(catalog.related("WATER", RelationKind::Narrower, 2).count(), 0);
}

#[test]
fn union_and_intersection() {
    let dir = tempfile::TempDir::new().unwrap();
    let catalog = open(&dir);
    let lists = ["A-2020-2", "B-2021-2"];

    let union = catalog.union(&lists, 3).unwrap();
    let rendered: Vec<String> = union.iter().map(ToString::to_string).collect();
    assert_eq!(
        rendered,
        vec![
            "  \t1\tANIMAL\tDOG (1, A-2020-2)".to_string(),
            "  \t3\tWATER\t".to_string(),
        ]
    );

    let intersection = catalog.intersection(&lists, 3).unwrap();
    assert_eq!(intersection.len(), 1);
    assert_eq!(intersection[0].id, "3");
    assert!(intersection.iter().all(|row| union.iter().any(|u| u.id == row.id)));
}

#[test]
fn conceptlist_write_then_read() {
    let dir = tempfile::TempDir::new().unwrap();
    let catalog = open(&dir);
    let list = catalog.conceptlist("A-2020-2").unwrap();
    assert!(!list.meta.local);
    assert_eq!(list.meta.author, "Alpha, Ann");

    let path = dir.path().join("out").join("A-2020-2.tsv");
    write_conceptlist(&list, &path).unwrap();
    let back = ConceptList::from_file(&path).unwrap();
    assert_eq!(back.id(), list.id());
    assert!(back.meta.local);
    assert_eq!(back.len(), list.len());
    for (a, b) in list.concepts().iter().zip(back.concepts()) {
        assert_eq!(a.id, b.id);
        assert_eq!(a.number, b.number);
        assert_eq!(a.label(), b.label());
        assert_eq!(a.concepticon_id, b.concepticon_id);
    }

    // A path reference loads the same list as a local one.
    let local = catalog.conceptlist(path.to_str().unwrap()).unwrap();
    assert_eq!(local.stats().mapped, 2);
}

#[test]
fn clean_catalogue_passes_check() {
    let dir = tempfile::TempDir::new().unwrap();
    let catalog = open(&dir);
    assert_eq!(catalog.check().unwrap(), vec![]);
}

#[test]
fn config_file_opens_the_catalogue() {
    let dir = tempfile::TempDir::new().unwrap();
    repository(dir.path());
    let path = dir.path().join("concepticon.toml");
    let mut config = CatalogConfig::with_repos(dir.path());
    config.search_depth = 1;
    config.save(&path).unwrap();

    let loaded = CatalogConfig::load(&path).unwrap();
    assert_eq!(loaded.search_depth, 1);
    let catalog = Concepticon::open(&loaded).unwrap();
    assert_eq!(catalog.config().search_depth, 1);
}
