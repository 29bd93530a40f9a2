use crate::error::ResolverError;
use crate::types::{ConstraintOp, Requirement, VersionConstraint};

use nom::{
    bytes::complete::{is_not, take_while1},
    character::complete::{char, multispace0, space0, space1},
    combinator::{map_res, opt},
    multi::separated_list1,
    sequence::preceded,
    IResult,
};

// parser combinators
fn package_name(i: &str) -> IResult<&str, &str> {
    take_while1(|c: char| !c.is_whitespace() && c != ',' && c != '|' && c != '(')(i)
}

fn constraint_op(i: &str) -> IResult<&str, ConstraintOp> {
    map_res(
        take_while1(|c| c == '>' || c == '<' || c == '='),
        |op: &str| ConstraintOp::parse(op).ok_or(()),
    )(i)
}

fn version_constraint(i: &str) -> IResult<&str, VersionConstraint> {
    let (i, _) = char('(')(i)?;
    let (i, _) = space0(i)?;
    let (i, op) = constraint_op(i)?;
    let (i, _) = space1(i)?;
    let (i, version) = is_not(")")(i)?;
    let (i, _) = char(')')(i)?;
    Ok((
        i,
        VersionConstraint {
            op,
            version: version.trim().to_string(),
        },
    ))
}

fn relation(i: &str) -> IResult<&str, Requirement> {
    let (i, _) = multispace0(i)?;
    let (i, name) = package_name(i)?;
    let (i, constraint) = opt(preceded(multispace0, version_constraint))(i)?;
    Ok((
        i,
        Requirement::Relation {
            package: name.to_string(),
            constraint,
        },
    ))
}

// A group of pipe-separated alternatives; a lone atom stays a bare relation.
fn clause(i: &str) -> IResult<&str, Requirement> {
    let (i, mut alternatives) =
        separated_list1(preceded(multispace0, char('|')), relation)(i)?;
    let req = if alternatives.len() == 1 {
        alternatives.remove(0)
    } else {
        Requirement::Or(alternatives)
    };
    Ok((i, req))
}

fn relation_expr(i: &str) -> IResult<&str, Requirement> {
    let (i, mut clauses) = separated_list1(preceded(multispace0, char(',')), clause)(i)?;
    let (i, _) = multispace0(i)?;
    let req = if clauses.len() == 1 {
        clauses.remove(0)
    } else {
        Requirement::And(clauses)
    };
    Ok((i, req))
}

/// Parse a `Depends`/`Pre-Depends`/`Breaks` field value into a requirement
/// tree. Empty or all-whitespace input yields an empty `And`.
pub fn parse_relations(input: &str) -> Result<Requirement, ResolverError> {
    if input.trim().is_empty() {
        return Ok(Requirement::And(Vec::new()));
    }
    match relation_expr(input) {
        Ok(("", requirement)) => Ok(requirement),
        _ => Err(ResolverError::MalformedRelation(input.to_string())),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn relation_of(package: &str) -> Requirement {
        Requirement::Relation {
            package: package.to_string(),
            constraint: None,
        }
    }

    fn constrained(package: &str, op: ConstraintOp, version: &str) -> Requirement {
        Requirement::Relation {
            package: package.to_string(),
            constraint: Some(VersionConstraint {
                op,
                version: version.to_string(),
            }),
        }
    }

    const LONG_DEPENDS: &str = "libamd2 (>= 1:4.5.2), libavcodec58 | libavcodec-extra58, libavformat58, libavutil56, libblas3 | libblas.so.3, libbtf1 (>= 1:4.5.2), libc6 (>= 2.15), libccolamd2 (>= 1:4.5.2), libcholmod3 (>= 1:4.5.2), libcolamd2 (>= 1:4.5.2), libcxsparse3 (>= 1:4.5.2), libgcc1 (>= 1:4.0), libjpeg62-turbo (>= 1.3.1), libklu1 (>= 1:4.5.2), liblapack3 | liblapack.so.3, libldl2 (>= 1:4.5.2), libopencv-calib3d3.2, libopencv-contrib3.2, libopencv-core3.2, libopencv-features2d3.2, libopencv-flann3.2, libopencv-highgui3.2, libopencv-imgcodecs3.2, libopencv-imgproc3.2, libopencv-ml3.2, libopencv-objdetect3.2, libopencv-photo3.2, libopencv-shape3.2, libopencv-stitching3.2, libopencv-superres3.2, libopencv-video3.2, libopencv-videoio3.2, libopencv-videostab3.2, libopencv-viz3.2, libspqr2 (>= 1:5.2.0+dfsg), libstdc++6 (>= 5.2), libswscale5 (>= 7:4.0), libumfpack5 (>= 1:4.5.2), libwxbase3.0-0v5 (>= 3.0.4+dfsg), libwxgtk3.0-0v5 (>= 3.0.4+dfsg), zlib1g (>= 1:1.2.3.4)";

    #[test]
    fn parse_complex_depends() {
        let requirement = parse_relations(LONG_DEPENDS).unwrap();
        let children = match requirement {
            Requirement::And(children) => children,
            other => panic!("expected top-level And, got {:?}", other),
        };
        assert_eq!(children.len(), 41);
        assert_eq!(
            children[0],
            constrained("libamd2", ConstraintOp::GreaterEq, "1:4.5.2")
        );
        assert_eq!(
            children[1],
            Requirement::Or(vec![
                relation_of("libavcodec58"),
                relation_of("libavcodec-extra58"),
            ])
        );
    }

    #[test]
    fn parse_simple_list() {
        assert_eq!(
            parse_relations("libamd2 , libavcodec58").unwrap(),
            Requirement::And(vec![relation_of("libamd2"), relation_of("libavcodec58")])
        );
    }

    #[test]
    fn parse_versioned_clauses() {
        assert_eq!(
            parse_relations("kek (<< 1.7), meep (= 1.3.2)").unwrap(),
            Requirement::And(vec![
                constrained("kek", ConstraintOp::StrictlyLess, "1.7"),
                constrained("meep", ConstraintOp::Equal, "1.3.2"),
            ])
        );
    }

    #[test]
    fn single_clause_collapses_to_leaf() {
        assert_eq!(
            parse_relations("libamd2 (>= 1:4.5.2)").unwrap(),
            constrained("libamd2", ConstraintOp::GreaterEq, "1:4.5.2")
        );
    }

    #[test]
    fn single_or_clause_collapses_to_or() {
        assert_eq!(
            parse_relations("libamd2 (>= 1:4.5.2) | libc6").unwrap(),
            Requirement::Or(vec![
                constrained("libamd2", ConstraintOp::GreaterEq, "1:4.5.2"),
                relation_of("libc6"),
            ])
        );
    }

    #[test]
    fn or_group_nested_in_and() {
        assert_eq!(
            parse_relations("libamd2 (= 1:4.5.2), libkek | libc6 (>= 2.15), bruv").unwrap(),
            Requirement::And(vec![
                constrained("libamd2", ConstraintOp::Equal, "1:4.5.2"),
                Requirement::Or(vec![
                    relation_of("libkek"),
                    constrained("libc6", ConstraintOp::GreaterEq, "2.15"),
                ]),
                relation_of("bruv"),
            ])
        );
    }

    #[test]
    fn empty_input_is_empty_and() {
        assert_eq!(parse_relations("").unwrap(), Requirement::And(Vec::new()));
        assert_eq!(parse_relations("   ").unwrap(), Requirement::And(Vec::new()));
    }

    #[test]
    fn trailing_whitespace_is_accepted() {
        assert_eq!(parse_relations("libamd2  ").unwrap(), relation_of("libamd2"));
    }

    #[test]
    fn unknown_operator_is_rejected() {
        assert!(matches!(
            parse_relations("kek (=> 1.0)"),
            Err(ResolverError::MalformedRelation(_))
        ));
    }

    #[test]
    fn unterminated_constraint_is_rejected() {
        assert!(matches!(
            parse_relations("kek (>> 2.0.0"),
            Err(ResolverError::MalformedRelation(_))
        ));
    }
}
