use std::cmp::Ordering;

use yang_schema::list::{ListMember, MergeType, ValueList};
use yang_schema::types::BaseType;
use yang_schema::ErrorCode;

fn strlist(value: &str) -> ValueList {
    let mut list = ValueList::new(BaseType::String);
    list.set_strlist(value);
    list
}

fn strings(list: &ValueList) -> Vec<&str> {
    list.strings().collect()
}

#[test]
fn list_set_strlist() {
    let list = strlist("  alpha beta\tgamma\n");

    assert_eq!(list.len(), 3);
    assert!(list.contains_str("beta"));
    assert!(!list.contains_str("delta"));
    assert_eq!(list.first(), Some(&ListMember::Str("alpha".to_owned())));
    assert!(strlist("   ").is_empty());
}

#[test]
fn list_set_typed() {
    let mut list = ValueList::new(BaseType::None);
    list.set_list(BaseType::Uint8, "1 200 7").expect("Failed to set list");
    assert_eq!(list.btype(), BaseType::Uint8);
    assert_eq!(
        list.iter().cloned().collect::<Vec<_>>(),
        vec![ListMember::Uint(1), ListMember::Uint(200), ListMember::Uint(7)]
    );

    let mut list = ValueList::new(BaseType::None);
    let error = list.set_list(BaseType::Uint8, "1 256").unwrap_err();
    assert_eq!(error.errcode, ErrorCode::InvalidValue);
    assert!(list.is_empty());

    let error = list.set_list(BaseType::Boolean, "true maybe").unwrap_err();
    assert_eq!(error.errcode, ErrorCode::InvalidValue);

    list.set_list(BaseType::Int8, "-128 127").unwrap();
    assert_eq!(list.len(), 2);
}

#[test]
fn list_insert_modes() {
    let mut list = strlist("b d");

    list.insert(ListMember::Str("c".to_owned()), MergeType::Sort);
    list.insert(ListMember::Str("z".to_owned()), MergeType::First);
    list.insert(ListMember::Str("a".to_owned()), MergeType::Last);
    assert_eq!(strings(&list), vec!["z", "b", "c", "d", "a"]);
}

#[test]
fn list_merge() {
    let mut dest = strlist("a c");
    let mut src = strlist("b c d");
    dest.merge(&mut src, MergeType::Sort, false);
    assert_eq!(strings(&dest), vec!["a", "b", "c", "d"]);
    assert!(src.is_empty());

    let mut src = strlist("a");
    dest.merge(&mut src, MergeType::Last, true);
    assert_eq!(strings(&dest), vec!["a", "b", "c", "d", "a"]);
}

#[test]
fn list_compare_and_copy() {
    let short = strlist("a b");
    let long = strlist("a b c");
    let other = strlist("a c");

    assert_eq!(short.compare(&long), Ordering::Less);
    assert_eq!(long.compare(&other), Ordering::Less);
    assert_eq!(short.compare(&short.clone()), Ordering::Equal);

    let mut copy = ValueList::new(BaseType::None);
    long.copy_to(&mut copy).expect("Failed to copy list");
    assert_eq!(copy, long);

    let mut numbers = ValueList::new(BaseType::Int32);
    let error = long.copy_to(&mut numbers).unwrap_err();
    assert_eq!(error.errcode, ErrorCode::WrongType);
}

#[test]
fn list_find() {
    let mut list = ValueList::new(BaseType::Int32);
    list.set_list(BaseType::Int32, "-5 10").unwrap();

    assert!(list.find(&ListMember::Int(-5)).is_some());
    assert!(list.find(&ListMember::Uint(10)).is_none());
    assert_eq!(list.strings().count(), 0);
}
