use async_graphql_parser::parse_query;

use super::{convert, variables_from_json, ConvertError, ConvertOptions, ResolveInfo};
use crate::schema::SdlRegistry;

pub const USER_SCHEMA: &str = r#"
    type Widget {
        id: ID!
        name: String!
    }

    type User {
        id: ID!
        name: String!
        widgets(page: Int): [Widget!]!
        test(foo: Int): Int
    }

    type Query {
        widget(id: ID!): Widget
        user(id: ID!): User
    }
"#;

pub const STAR_WARS_SCHEMA: &str = r#"
    schema {
        query: Query
        mutation: Mutation
        subscription: Subscription
    }

    type Query {
        hero(episode: Episode): Character
        search(text: String): [SearchResult]
        human(id: ID!): Human
    }

    type Mutation {
        createReview(episode: Episode, review: ReviewInput!): Review
    }

    type Subscription {
        reviewAdded(episode: Episode): Review
    }

    enum Episode { NEWHOPE EMPIRE JEDI }

    enum LengthUnit { METER FOOT }

    interface Character {
        id: ID!
        name: String!
        friends: [Character]
        appearsIn: [Episode]!
    }

    type Human implements Character {
        id: ID!
        name: String!
        height(unit: LengthUnit = METER): Float
        friends: [Character]
        appearsIn: [Episode]!
        starships: [Starship]
    }

    type Droid implements Character {
        id: ID!
        name: String!
        friends: [Character]
        appearsIn: [Episode]!
        primaryFunction: String
    }

    type Starship {
        id: ID!
        name: String!
        length(unit: LengthUnit = METER): Float
    }

    type Review {
        stars: Int!
        commentary: String
    }

    input ReviewInput {
        stars: Int!
        commentary: String
    }

    union SearchResult = Human | Droid | Starship
"#;

/// Parses `schema` and `query`, converts the query and returns the result as JSON.
pub fn convert_query(
    schema: &str,
    query: &str,
    variables: serde_json::Value,
    options: ConvertOptions,
) -> Result<serde_json::Value, ConvertError> {
    let registry = SdlRegistry::parse(schema).expect("schema should parse");
    let document = parse_query(query).expect("query should parse");
    let variables = variables_from_json(variables);
    let info = ResolveInfo::from_document(&document, None, &registry, Some(&variables))?;
    let record = convert(&info, options)?;

    Ok(serde_json::to_value(&record).expect("record should serialize"))
}
