use proptest::prelude::*;
use simplify_js::lattice::effects::Dropped;
use simplify_js::lattice::effects::Effects;
use simplify_js::lattice::effects::VarEffects;
use simplify_js::lattice::eval_times::EvalTimes;
use simplify_js::lattice::flow::ControlFlow;
use simplify_js::lattice::rw::MayThrow;
use simplify_js::lattice::rw::ReadWrite;

fn rw() -> impl Strategy<Value = ReadWrite> {
  prop_oneof![
    Just(ReadWrite::None),
    Just(ReadWrite::Read),
    Just(ReadWrite::Write),
  ]
}

fn may_throw() -> impl Strategy<Value = MayThrow> {
  prop_oneof![Just(MayThrow::Bottom), Just(MayThrow::Top)]
}

// A handful of shared names so that generated maps actually collide.
fn var_effects() -> impl Strategy<Value = VarEffects> {
  prop::collection::vec(("[abc]", rw()), 0..4).prop_map(|entries| {
    let mut vars = VarEffects::new();
    for (name, access) in entries {
      vars.record(&name, access);
    }
    vars
  })
}

fn effects() -> impl Strategy<Value = Effects> {
  (
    prop_oneof![
      4 => var_effects().prop_map(Dropped::Value),
      1 => Just(Dropped::Top),
    ],
    rw(),
    may_throw(),
  )
    .prop_map(|(vars, heap, throws)| Effects { vars, heap, throws })
}

proptest! {
  #[test]
  fn lub_is_commutative(a in effects(), b in effects()) {
    prop_assert_eq!(a.lub(&b), b.lub(&a));
  }

  #[test]
  fn lub_is_associative(a in effects(), b in effects(), c in effects()) {
    prop_assert_eq!(a.lub(&b).lub(&c), a.lub(&b.lub(&c)));
  }

  #[test]
  fn lub_is_idempotent(a in effects()) {
    prop_assert_eq!(a.lub(&a), a);
  }

  #[test]
  fn lub_is_an_upper_bound(a in effects(), b in effects()) {
    let join = a.lub(&b);
    prop_assert!(a.lte(&join));
    prop_assert!(b.lte(&join));
  }

  #[test]
  fn lte_agrees_with_lub(a in effects(), b in effects()) {
    // a ⊑ b iff joining b into a adds nothing beyond b.
    prop_assert_eq!(a.lte(&b), a.lub(&b) == b);
  }

  #[test]
  fn lub_into_reports_change(a in effects(), b in effects()) {
    let mut acc = a.clone();
    let changed = acc.lub_into(&b);
    prop_assert_eq!(acc, a.lub(&b));
    prop_assert_eq!(changed, !b.lte(&a));
  }

  #[test]
  fn bottom_and_top_are_extremes(a in effects()) {
    prop_assert!(Effects::bottom().lte(&a));
    prop_assert!(a.lte(&Effects::top()));
  }

  #[test]
  fn commutes_with_is_symmetric(a in effects(), b in effects()) {
    prop_assert_eq!(a.commutes_with(&b), b.commutes_with(&a));
  }

  #[test]
  fn bottom_commutes_with_everything(a in effects()) {
    prop_assert!(Effects::bottom().commutes_with(&a));
  }

  #[test]
  fn read_only_fragments_commute(a in effects(), b in effects()) {
    if a.is_read_only() && b.is_read_only() {
      prop_assert!(a.commutes_with(&b));
    }
  }

  #[test]
  fn commuting_is_monotone_downward(a in effects(), b in effects(), c in effects()) {
    // Shrinking one side never breaks commutativity.
    if a.lte(&b) && b.commutes_with(&c) {
      prop_assert!(a.commutes_with(&c));
    }
  }

  #[test]
  fn hide_vars_never_grows(a in effects(), names in prop::collection::hash_set("[abc]", 0..3)) {
    let names = names.into_iter().collect();
    prop_assert!(a.hide_vars(&names).lte(&a));
  }

  #[test]
  fn without_throws_never_grows(a in effects()) {
    prop_assert!(a.without_throws().lte(&a));
  }
}

const EVAL_TIMES: [EvalTimes; 4] = [
  EvalTimes::Once,
  EvalTimes::Opt,
  EvalTimes::AtLeastOnce,
  EvalTimes::Any,
];

const FLOWS: [ControlFlow; 3] = [
  ControlFlow::FallsThrough,
  ControlFlow::Diverges,
  ControlFlow::Unknown,
];

#[test]
fn eval_times_lattice_laws() {
  for a in EVAL_TIMES {
    assert_eq!(a.lub(a), a);
    assert!(EvalTimes::Once.lte(a));
    assert!(a.lte(EvalTimes::Any));
    for b in EVAL_TIMES {
      let join = a.lub(b);
      assert_eq!(join, b.lub(a));
      assert!(a.lte(join));
      assert!(b.lte(join));
      assert_eq!(a.lte(b), join == b);
      for c in EVAL_TIMES {
        assert_eq!(a.lub(b).lub(c), a.lub(b.lub(c)));
      }
    }
  }
}

#[test]
fn eval_times_widenings_are_inflationary() {
  for a in EVAL_TIMES {
    assert!(a.lte(a.branched()));
    assert!(a.lte(a.looped()));
    // Both widenings are closures: applying them twice adds nothing.
    assert_eq!(a.branched().branched(), a.branched());
    assert_eq!(a.looped().looped(), a.looped());
  }
}

#[test]
fn control_flow_lattice_laws() {
  for a in FLOWS {
    assert_eq!(a.lub(a), a);
    assert!(a.lte(ControlFlow::Unknown));
    for b in FLOWS {
      let join = a.lub(b);
      assert_eq!(join, b.lub(a));
      assert!(a.lte(join));
      assert!(b.lte(join));
      for c in FLOWS {
        assert_eq!(a.lub(b).lub(c), a.lub(b.lub(c)));
      }
    }
  }
}

#[test]
fn control_flow_seq_is_associative_and_absorbing() {
  for a in FLOWS {
    assert_eq!(a.seq(ControlFlow::FallsThrough), a);
    assert_eq!(ControlFlow::FallsThrough.seq(a), a);
    assert_eq!(ControlFlow::Diverges.seq(a), ControlFlow::Diverges);
    for b in FLOWS {
      for c in FLOWS {
        assert_eq!(a.seq(b).seq(c), a.seq(b.seq(c)));
      }
    }
  }
}
