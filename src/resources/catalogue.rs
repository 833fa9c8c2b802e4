use super::{ResourceSpec, StatsSpec};
use crate::api::format::{public_member, public_record};
use crate::auth::Role::{self, Admin, Editor, Finance, Reviewer};
use crate::filter::{ExactFilter, FieldSpec, SortDirection};

const EDITORIAL: &[Role] = &[Admin, Editor];
const EDITORIAL_REVIEW: &[Role] = &[Admin, Editor, Reviewer];
const FINANCE: &[Role] = &[Admin, Finance];
const ADMIN_ONLY: &[Role] = &[Admin];

const PUBLISHING: &[&str] = &["draft", "published", "archived"];
const REVIEW: &[&str] = &["pending", "in_review", "approved", "rejected"];
const STORY_REVIEW: &[&str] = &["pending", "in_review", "approved", "rejected", "published"];
const CONTACT: &[&str] = &["new", "read", "replied", "archived"];
const MEMBERSHIP: &[&str] = &["pending", "active", "expired", "cancelled"];
const FULFILMENT: &[&str] = &["pending", "processing", "shipped", "delivered", "cancelled"];
const PAYMENT: &[&str] = &["pending", "paid", "failed", "refunded"];
const ATTENDANCE: &[&str] = &["pending", "confirmed", "cancelled", "attended"];

const NEWEST_FIRST: (&str, SortDirection) = ("createdAt", SortDirection::Desc);

/// "grace akinyi" must find a record split into firstName/lastName.
const FULL_NAME: &[&[&str]] = &[&["firstName", "lastName"]];

pub static RESOURCES: &[ResourceSpec] = &[
    ResourceSpec {
        name: "contacts",
        collection: "contacts",
        response_key: "contacts",
        fields: FieldSpec {
            exact: &[ExactFilter::one_of("status", CONTACT), ExactFilter::any("subject")],
            search_param: "search",
            search_fields: &["name", "email", "subject", "message"],
            search_joined: &[],
        },
        statuses: CONTACT,
        sort_fields: &["createdAt", "name", "email", "status"],
        default_sort: NEWEST_FIRST,
        read_roles: EDITORIAL,
        mutate_roles: EDITORIAL,
        stats: Some(StatsSpec::by_status()),
        mapper: public_record,
    },
    ResourceSpec {
        name: "members",
        collection: "members",
        response_key: "members",
        fields: FieldSpec {
            exact: &[
                ExactFilter::one_of("status", MEMBERSHIP),
                ExactFilter::any("membershipType"),
                ExactFilter::any("county"),
            ],
            search_param: "search",
            search_fields: &["firstName", "lastName", "name", "email", "phone"],
            search_joined: FULL_NAME,
        },
        statuses: MEMBERSHIP,
        sort_fields: &["createdAt", "lastName", "email", "status", "membershipType"],
        default_sort: NEWEST_FIRST,
        read_roles: EDITORIAL,
        mutate_roles: ADMIN_ONLY,
        stats: Some(StatsSpec::by_status()),
        mapper: public_member,
    },
    ResourceSpec {
        name: "orders",
        collection: "orders",
        response_key: "orders",
        fields: FieldSpec {
            exact: &[
                ExactFilter::one_of("status", FULFILMENT),
                ExactFilter::one_of("paymentStatus", PAYMENT),
                ExactFilter::any("paymentMethod"),
            ],
            search_param: "search",
            search_fields: &["orderNumber", "customerName", "customerEmail", "customerPhone"],
            search_joined: &[],
        },
        statuses: FULFILMENT,
        sort_fields: &["createdAt", "totalAmount", "status", "paymentStatus"],
        default_sort: NEWEST_FIRST,
        read_roles: FINANCE,
        mutate_roles: FINANCE,
        stats: Some(StatsSpec::revenue("totalAmount", "paymentStatus")),
        mapper: public_record,
    },
    ResourceSpec {
        name: "jobs",
        collection: "jobs",
        response_key: "jobs",
        fields: FieldSpec {
            exact: &[
                ExactFilter::one_of("status", PUBLISHING),
                ExactFilter::any("employmentType"),
                ExactFilter::any("location"),
            ],
            search_param: "search",
            search_fields: &["title", "department", "location", "description"],
            search_joined: &[],
        },
        statuses: PUBLISHING,
        sort_fields: &["createdAt", "title", "deadline", "status"],
        default_sort: NEWEST_FIRST,
        read_roles: EDITORIAL,
        mutate_roles: EDITORIAL,
        stats: Some(StatsSpec::by_status()),
        mapper: public_record,
    },
    ResourceSpec {
        name: "news",
        collection: "news",
        response_key: "news",
        fields: FieldSpec {
            exact: &[ExactFilter::one_of("status", PUBLISHING), ExactFilter::any("category")],
            search_param: "search",
            search_fields: &["title", "excerpt", "author", "content"],
            search_joined: &[],
        },
        statuses: PUBLISHING,
        sort_fields: &["createdAt", "publishedAt", "title", "status"],
        default_sort: NEWEST_FIRST,
        read_roles: EDITORIAL_REVIEW,
        mutate_roles: EDITORIAL,
        stats: Some(StatsSpec::by_status()),
        mapper: public_record,
    },
    ResourceSpec {
        name: "stories",
        collection: "stories",
        response_key: "stories",
        fields: FieldSpec {
            exact: &[ExactFilter::one_of("status", STORY_REVIEW), ExactFilter::any("category")],
            search_param: "search",
            search_fields: &["title", "authorName", "authorEmail", "content"],
            search_joined: &[],
        },
        statuses: STORY_REVIEW,
        sort_fields: &["createdAt", "title", "status"],
        default_sort: NEWEST_FIRST,
        read_roles: EDITORIAL_REVIEW,
        mutate_roles: EDITORIAL_REVIEW,
        stats: Some(StatsSpec::by_status()),
        mapper: public_record,
    },
    ResourceSpec {
        name: "toolkits",
        collection: "toolkits",
        response_key: "toolkits",
        fields: FieldSpec {
            exact: &[ExactFilter::one_of("status", PUBLISHING), ExactFilter::any("category")],
            search_param: "search",
            search_fields: &["title", "description"],
            search_joined: &[],
        },
        statuses: PUBLISHING,
        sort_fields: &["createdAt", "title", "status"],
        default_sort: NEWEST_FIRST,
        read_roles: EDITORIAL,
        mutate_roles: EDITORIAL,
        stats: None,
        mapper: public_record,
    },
    ResourceSpec {
        name: "partnerships",
        collection: "partnerships",
        response_key: "partnerships",
        fields: FieldSpec {
            exact: &[ExactFilter::one_of("status", REVIEW), ExactFilter::any("partnershipType")],
            search_param: "search",
            search_fields: &["organizationName", "contactName", "email", "message"],
            search_joined: &[],
        },
        statuses: REVIEW,
        sort_fields: &["createdAt", "organizationName", "status"],
        default_sort: NEWEST_FIRST,
        read_roles: EDITORIAL,
        mutate_roles: ADMIN_ONLY,
        stats: Some(StatsSpec::by_status()),
        mapper: public_record,
    },
    ResourceSpec {
        name: "volunteers",
        collection: "volunteer_applications",
        response_key: "volunteers",
        fields: FieldSpec {
            exact: &[ExactFilter::one_of("status", REVIEW), ExactFilter::any("area")],
            search_param: "search",
            search_fields: &["firstName", "lastName", "email", "phone", "skills"],
            search_joined: FULL_NAME,
        },
        statuses: REVIEW,
        sort_fields: &["createdAt", "lastName", "status"],
        default_sort: NEWEST_FIRST,
        read_roles: EDITORIAL,
        mutate_roles: EDITORIAL,
        stats: Some(StatsSpec::by_status()),
        mapper: public_record,
    },
    ResourceSpec {
        name: "registrations",
        collection: "event_registrations",
        response_key: "registrations",
        fields: FieldSpec {
            exact: &[
                ExactFilter::one_of("status", ATTENDANCE),
                ExactFilter::any("eventId"),
                ExactFilter::one_of("paymentStatus", PAYMENT),
            ],
            search_param: "search",
            search_fields: &["name", "email", "phone", "organization"],
            search_joined: &[],
        },
        statuses: ATTENDANCE,
        sort_fields: &["createdAt", "name", "status", "paymentStatus"],
        default_sort: NEWEST_FIRST,
        read_roles: &[Admin, Editor, Finance],
        mutate_roles: EDITORIAL,
        stats: Some(StatsSpec::revenue("amountPaid", "paymentStatus")),
        mapper: public_record,
    },
];

pub fn find(name: &str) -> Option<&'static ResourceSpec> {
    RESOURCES.iter().find(|r| r.name == name)
}
